// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The collaborators the monitor needs, assembled from command-line flags.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use sagen_master::{LoadReport, Master, MasterSettings, RoleSet, Roles, StaticDirectory, StaticRoles};
use sagen_master_audit::AuditService;
use sagen_master_config::MasterConfig;
use tracing::warn;

#[derive(Args, Debug, Clone, Default)]
pub struct WorldArgs {
	/// Treat NAME as a wizard-class player
	#[arg(long = "privileged", value_name = "NAME", global = true)]
	pub privileged: Vec<String>,

	/// Make USER a verified member of GROUP
	#[arg(long = "member", value_name = "USER=GROUP", value_parser = parse_pair, global = true)]
	pub members: Vec<(String, String)>,

	/// Give USER a global role (ELDER, WIZARD, ARCHWIZARD, ADMIN)
	#[arg(long = "role", value_name = "USER=ROLE", value_parser = parse_pair, global = true)]
	pub roles: Vec<(String, String)>,

	/// Make USER a wizard of DOMAIN
	#[arg(long = "domain-wizard", value_name = "USER=DOMAIN", value_parser = parse_pair, global = true)]
	pub domain_wizards: Vec<(String, String)>,

	/// Make USER lord of DOMAIN
	#[arg(long = "domain-lord", value_name = "USER=DOMAIN", value_parser = parse_pair, global = true)]
	pub domain_lords: Vec<(String, String)>,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
	match s.split_once('=') {
		Some((left, right)) if !left.is_empty() && !right.is_empty() => {
			Ok((left.to_string(), right.to_string()))
		}
		_ => Err(format!("expected LEFT=RIGHT, got '{s}'")),
	}
}

impl WorldArgs {
	pub fn directory(&self) -> StaticDirectory {
		let directory = self
			.privileged
			.iter()
			.fold(StaticDirectory::new(), |d, name| d.with_privileged(name.as_str()));
		self
			.members
			.iter()
			.fold(directory, |d, (user, group)| d.with_member(user.as_str(), group.as_str()))
	}

	pub fn roles(&self) -> anyhow::Result<StaticRoles> {
		let mut sets: BTreeMap<&str, RoleSet> = BTreeMap::new();
		for (user, role) in &self.roles {
			let flag = Roles::from_name(&role.to_ascii_uppercase())
				.with_context(|| format!("unknown role '{role}' for {user}"))?;
			sets.entry(user.as_str()).or_default().global |= flag;
		}
		for (user, domain) in &self.domain_wizards {
			sets.entry(user.as_str())
				.or_default()
				.domain_wizard_of
				.insert(domain.as_str().into());
		}
		for (user, domain) in &self.domain_lords {
			sets.entry(user.as_str())
				.or_default()
				.domain_lord_of
				.insert(domain.as_str().into());
		}

		Ok(sets
			.into_iter()
			.fold(StaticRoles::new(), |roles, (user, set)| roles.with(user, set)))
	}
}

/// Build the monitor and load its policy tables.
pub fn build_master(config: &MasterConfig, world: &WorldArgs) -> anyhow::Result<(Master, LoadReport)> {
	let audit = AuditService::from_config(&config.audit).context("invalid audit configuration")?;
	let master = Master::builder(MasterSettings::from_config(config))
		.directory(Arc::new(world.directory()))
		.roles(Arc::new(world.roles()?))
		.audit(audit)
		.build();

	let report = master.reload_policy();
	for error in report.errors() {
		warn!(error = %error, "policy table not loaded");
	}
	Ok((master, report))
}

#[cfg(test)]
mod tests {
	use super::*;
	use sagen_master::{GroupId, RoleSource, UserId};

	fn pair(l: &str, r: &str) -> (String, String) {
		(l.to_string(), r.to_string())
	}

	#[test]
	fn pairs_need_both_sides() {
		assert_eq!(parse_pair("bob=Ex"), Ok(pair("bob", "Ex")));
		assert!(parse_pair("bob").is_err());
		assert!(parse_pair("=Ex").is_err());
	}

	#[test]
	fn roles_accumulate_per_user() {
		let world = WorldArgs {
			roles: vec![pair("wiz", "wizard"), pair("wiz", "ELDER")],
			domain_lords: vec![pair("wiz", "Ex")],
			..Default::default()
		};
		let roles = world.roles().unwrap();
		let set = roles.role_of(&UserId::from("wiz"));
		assert!(set.global.contains(Roles::MORTAL | Roles::WIZARD | Roles::ELDER));
		assert!(set.is_domain_lord(&GroupId::from("Ex")));
		assert_eq!(roles.role_of(&UserId::from("bob")).global, Roles::MORTAL);
	}

	#[test]
	fn unknown_role_is_an_error() {
		let world = WorldArgs {
			roles: vec![pair("wiz", "overlord")],
			..Default::default()
		};
		assert!(world.roles().is_err());
	}
}
