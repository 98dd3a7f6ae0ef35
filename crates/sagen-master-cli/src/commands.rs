// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::{Args, Subcommand};
use sagen_master::{
	preload_list, Credential, Decision, GroupId, LoadReport, Master, ObjectRef, Privileges, UserId,
};
use sagen_master_config::MasterConfig;
use serde::Serialize;
use tracing::warn;

/// Where command results go: human text or pretty JSON on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
	json: bool,
}

impl Output {
	pub fn new(json: bool) -> Self {
		Self { json }
	}

	pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
		let text = if self.json {
			serde_json::to_string_pretty(value)?
		} else {
			human(value)
		};
		println!("{text}");
		Ok(())
	}
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
	/// Ask valid_read for a path
	Read(TargetArgs),
	/// Ask valid_write for a path
	Write(TargetArgs),
	/// Ask valid_link for a pair of paths
	Link {
		from: String,
		to: String,
		#[command(flatten)]
		actor: ActorArgs,
	},
}

#[derive(Args, Debug)]
pub struct TargetArgs {
	pub path: String,

	/// Operation name as the driver reports it
	#[arg(long = "op", default_value = "read_file")]
	pub operation: String,

	#[command(flatten)]
	pub actor: ActorArgs,
}

#[derive(Args, Debug)]
pub struct ActorArgs {
	/// Credential of the requesting object (user:group)
	#[arg(long = "as", value_name = "CREDENTIAL")]
	pub credential: Credential,

	/// Effective credential, when it differs from --as
	#[arg(long)]
	pub euid: Option<Credential>,

	/// Program name of the requesting object
	#[arg(long, default_value = "/secure/obj/player/player#1")]
	pub object: String,

	/// The requester is a live session
	#[arg(long)]
	pub interactive: bool,
}

impl ActorArgs {
	pub fn object_ref(&self) -> ObjectRef {
		let actor = ObjectRef::new(self.object.as_str(), self.credential.clone());
		let actor = if self.interactive { actor.interactive() } else { actor };
		let euid = self.euid.clone().unwrap_or_else(|| self.credential.clone());
		actor.with_euid(euid)
	}
}

#[derive(Debug, Serialize)]
struct CheckResult<'a> {
	gate: &'static str,
	actor: String,
	decision: &'a Decision,
}

pub fn check(master: &Master, command: CheckCommand, output: &Output) -> anyhow::Result<()> {
	let (gate, actor, decision) = match &command {
		CheckCommand::Read(target) => {
			let actor = target.actor.object_ref();
			let decision = master.valid_read(&target.path, &actor, &target.operation);
			("valid_read", actor, decision)
		}
		CheckCommand::Write(target) => {
			let actor = target.actor.object_ref();
			let decision = master.valid_write(&target.path, &actor, &target.operation);
			("valid_write", actor, decision)
		}
		CheckCommand::Link { from, to, actor } => {
			let actor = actor.object_ref();
			let decision = master.valid_link(from, to, &actor);
			("valid_link", actor, decision)
		}
	};

	let result = CheckResult {
		gate,
		actor: format!("{actor}[{}]", actor.euid_display()),
		decision: &decision,
	};
	output.emit(&result, |r| format!("{}: {} for {}", r.gate, r.decision, r.actor))
}

#[derive(Debug, Serialize)]
struct OwnerReport {
	path: String,
	author: UserId,
	domain: GroupId,
	creator: Credential,
	include_path: Vec<String>,
}

pub fn owner(master: &Master, path: &str, output: &Output) -> anyhow::Result<()> {
	let report = OwnerReport {
		path: path.to_string(),
		author: master.author_file(path),
		domain: master.domain_file(path),
		creator: master.creator_file(path),
		include_path: master.include_path(path),
	};
	output.emit(&report, |r| {
		format!(
			"{}\n  author:  {}\n  domain:  {}\n  creator: {}\n  include: {}",
			r.path,
			r.author,
			r.domain,
			r.creator,
			r.include_path.join(" ")
		)
	})
}

#[derive(Debug, Serialize)]
struct PrivsReport {
	path: String,
	privileges: Privileges,
}

pub fn privs(master: &Master, path: &str, output: &Output) -> anyhow::Result<()> {
	let report = PrivsReport {
		path: path.to_string(),
		privileges: master.privs_file(path),
	};
	output.emit(&report, |r| {
		let names: Vec<&str> = r.privileges.iter_names().map(|(name, _)| name).collect();
		if names.is_empty() {
			format!("{}: none", r.path)
		} else {
			format!("{}: {}", r.path, names.join("|"))
		}
	})
}

/// Print the load report; fails when any table did not load.
pub fn validate(report: &LoadReport, output: &Output) -> anyhow::Result<()> {
	output.emit(report, |r| {
		[&r.read_acl, &r.write_acl, &r.privileges]
			.iter()
			.map(|table| match &table.error {
				None => format!("ok     {} ({} patterns)", table.path.display(), table.patterns),
				Some(error) => format!("error  {}: {error}", table.path.display()),
			})
			.collect::<Vec<_>>()
			.join("\n")
	})?;

	if !report.is_complete() {
		anyhow::bail!("policy tables failed to load");
	}
	Ok(())
}

pub fn preloads(config: &MasterConfig, output: &Output) -> anyhow::Result<()> {
	let path = config.policy.preloads_path();
	let content = fs::read_to_string(&path)
		.with_context(|| format!("reading preload file {}", path.display()))?;

	let programs = preload_list(&content, |dir| list_dir(&config.policy.host_path(dir)));
	output.emit(&programs, |p| p.join("\n"))
}

fn list_dir(dir: &Path) -> Vec<String> {
	let entries = match fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(error) => {
			warn!(dir = %dir.display(), %error, "cannot list preload directory");
			return Vec::new();
		}
	};
	entries
		.filter_map(Result::ok)
		.filter_map(|entry| entry.file_name().into_string().ok())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	mod actor {
		use super::*;

		#[test]
		fn euid_defaults_to_uid() {
			let args = ActorArgs {
				credential: Credential::new("bob", "__Mortals__"),
				euid: None,
				object: "/players/b/bob/tool".to_string(),
				interactive: false,
			};
			let actor = args.object_ref();
			assert_eq!(actor.euid, Some(Credential::new("bob", "__Mortals__")));
			assert!(!actor.interactive);
		}

		#[test]
		fn explicit_euid_wins() {
			let args = ActorArgs {
				credential: Credential::new("bob", "__Mortals__"),
				euid: Some(Credential::new("bob", "__Wizards__")),
				object: "/secure/obj/player/player#1".to_string(),
				interactive: true,
			};
			let actor = args.object_ref();
			assert_eq!(actor.euid, Some(Credential::new("bob", "__Wizards__")));
			assert!(actor.interactive);
		}
	}

	mod preloads {
		use super::*;

		#[test]
		fn missing_directory_lists_nothing() {
			let dir = tempfile::tempdir().unwrap();
			assert!(list_dir(&dir.path().join("absent")).is_empty());
		}

		#[test]
		fn lists_file_names() {
			let dir = tempfile::tempdir().unwrap();
			fs::write(dir.path().join("a.c"), "").unwrap();
			fs::write(dir.path().join("b.h"), "").unwrap();
			let mut names = list_dir(dir.path());
			names.sort();
			assert_eq!(names, vec!["a.c".to_string(), "b.h".to_string()]);
		}
	}
}
