// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The driver-facing validation gates.
//!
//! [`Master`] owns the policy store and its collaborators and answers every
//! `valid_*` question the driver asks. The monitor object and anything
//! running with the root user id are always allowed; every other caller is
//! decided by the ACL tables or the privilege table. Each denial produces
//! one audit record.

mod files;
mod identity;
mod object;
mod privileged;

pub use object::{ObjectCandidate, ObjectRef, PermitShadows, ShadowHook};
pub use privileged::DatabaseDecision;

use std::sync::Arc;

use sagen_master_audit::{AuditEventType, AuditLogEntry, AuditService, AuditSeverity};
use sagen_master_config::MasterConfig;
use serde_json::json;
use tracing::{debug, info};

use crate::directory::{Directory, StaticDirectory};
use crate::engine::{check_acl, AccessRequest, Decision, DenyReason, Grant, Requester};
use crate::ids::{Credential, GroupId, UserId};
use crate::ownership;
use crate::path::{program_of, segments};
use crate::policy::{LoadReport, PolicySnapshot, PolicySources, PolicyStore};
use crate::privileges::Privileges;
use crate::roles::{RoleSource, StaticRoles};

/// Object paths and knobs the gates need, resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterSettings {
	pub master: String,
	pub simul_efun: String,
	pub scratch_dir: String,
	pub multi_instance: Vec<String>,
	pub shadow_suffix: String,
	pub database_password: Option<String>,
	pub sources: PolicySources,
}

impl MasterSettings {
	pub fn from_config(config: &MasterConfig) -> Self {
		let objects = &config.objects;
		Self {
			master: program_of(&objects.master).to_string(),
			simul_efun: program_of(&objects.simul_efun).to_string(),
			scratch_dir: objects.scratch_dir.clone(),
			multi_instance: objects
				.multi_instance
				.iter()
				.map(|p| program_of(p).to_string())
				.collect(),
			shadow_suffix: objects.shadow_suffix.clone(),
			database_password: config.database.password.clone(),
			sources: PolicySources::from_config(&config.policy),
		}
	}
}

/// The reference monitor.
pub struct Master {
	settings: MasterSettings,
	policy: PolicyStore,
	directory: Arc<dyn Directory>,
	roles: Arc<dyn RoleSource>,
	shadow_hook: Arc<dyn ShadowHook>,
	audit: AuditService,
}

/// Builder for [`Master`]. Unset collaborators default to empty static
/// implementations and a tracing-only audit service.
pub struct MasterBuilder {
	settings: MasterSettings,
	directory: Option<Arc<dyn Directory>>,
	roles: Option<Arc<dyn RoleSource>>,
	shadow_hook: Option<Arc<dyn ShadowHook>>,
	audit: Option<AuditService>,
}

impl MasterBuilder {
	pub fn directory(mut self, directory: Arc<dyn Directory>) -> Self {
		self.directory = Some(directory);
		self
	}

	pub fn roles(mut self, roles: Arc<dyn RoleSource>) -> Self {
		self.roles = Some(roles);
		self
	}

	pub fn shadow_hook(mut self, hook: Arc<dyn ShadowHook>) -> Self {
		self.shadow_hook = Some(hook);
		self
	}

	pub fn audit(mut self, audit: AuditService) -> Self {
		self.audit = Some(audit);
		self
	}

	/// Build the monitor. Policy tables start unloaded; call
	/// [`Master::reload_policy`] to load them.
	pub fn build(self) -> Master {
		Master {
			settings: self.settings,
			policy: PolicyStore::new(),
			directory: self
				.directory
				.unwrap_or_else(|| Arc::new(StaticDirectory::new())),
			roles: self.roles.unwrap_or_else(|| Arc::new(StaticRoles::new())),
			shadow_hook: self.shadow_hook.unwrap_or_else(|| Arc::new(PermitShadows)),
			audit: self.audit.unwrap_or_default(),
		}
	}
}

impl Master {
	pub fn builder(settings: MasterSettings) -> MasterBuilder {
		MasterBuilder {
			settings,
			directory: None,
			roles: None,
			shadow_hook: None,
			audit: None,
		}
	}

	pub fn settings(&self) -> &MasterSettings {
		&self.settings
	}

	pub fn policy(&self) -> &PolicyStore {
		&self.policy
	}

	pub fn snapshot(&self) -> Arc<PolicySnapshot> {
		self.policy.snapshot()
	}

	/// Reload every policy table from the configured sources.
	pub fn reload_policy(&self) -> LoadReport {
		let report = self.policy.reload(&self.settings.sources);

		if report.is_complete() {
			self.audit.log(
				AuditLogEntry::builder(AuditEventType::PolicyReloaded)
					.action(format!("policy snapshot {} installed", report.version))
					.details(json!({
						"version": report.version,
						"read_patterns": report.read_acl.patterns,
						"write_patterns": report.write_acl.patterns,
						"privilege_patterns": report.privileges.patterns,
					}))
					.build(),
			);
		} else {
			for error in report.errors() {
				self.audit.log(
					AuditLogEntry::builder(AuditEventType::PolicyLoadFailed)
						.action(error.to_string())
						.details(json!({ "version": report.version }))
						.build(),
				);
			}
		}

		info!(
			version = report.version,
			complete = report.is_complete(),
			"policy reloaded"
		);
		report
	}

	/// Privileges granted to the program at `path`.
	pub fn privs_file(&self, path: &str) -> Privileges {
		match segments(program_of(path)) {
			Some(segs) => self.policy.snapshot().privileges.lookup(&segs),
			None => Privileges::empty(),
		}
	}

	/// Credential stamped on an object created from `path`.
	pub fn creator_file(&self, path: &str) -> Credential {
		ownership::creator_of(path, self.directory.as_ref())
	}

	pub fn author_file(&self, path: &str) -> UserId {
		ownership::author_of(path)
	}

	pub fn domain_file(&self, path: &str) -> GroupId {
		ownership::domain_of(path, self.directory.as_ref())
	}

	pub fn include_path(&self, path: &str) -> Vec<String> {
		ownership::include_path(path)
	}

	fn is_monitor(&self, actor: &ObjectRef) -> bool {
		actor.program() == self.settings.master
	}

	fn is_trusted_subsystem(&self, actor: &ObjectRef) -> bool {
		actor.program() == self.settings.simul_efun
	}

	/// Grant for actors every gate lets through.
	fn privileged_actor(&self, actor: &ObjectRef) -> Option<Grant> {
		if self.is_monitor(actor) {
			return Some(Grant::Monitor);
		}
		if actor.euid.as_ref().is_some_and(|euid| euid.user.is_root()) {
			return Some(Grant::RootIdentity);
		}
		None
	}

	/// Grant for actors the privilege-table gates let through: the
	/// privileged actors plus the simul-efun object.
	fn trusted_caller(&self, actor: &ObjectRef) -> Option<Grant> {
		if self.is_trusted_subsystem(actor) {
			return Some(Grant::TrustedSubsystem);
		}
		self.privileged_actor(actor)
	}

	fn actor_privileges(&self, actor: &ObjectRef) -> Privileges {
		self.privs_file(&actor.name)
	}

	/// Run an ACL request for `actor`, using its effective credential and,
	/// for a live session, its roles.
	fn acl_decision(&self, actor: &ObjectRef, request: &AccessRequest) -> Decision {
		if let Some(grant) = self.privileged_actor(actor) {
			return Decision::Allow(grant);
		}
		let Some(euid) = actor.euid.as_ref() else {
			return Decision::Deny(DenyReason::MissingIdentity);
		};

		let snapshot = self.policy.snapshot();
		let roles = actor.interactive.then(|| self.roles.role_of(&actor.uid.user));
		let requester = Requester {
			credential: euid,
			roles: roles.as_ref(),
		};
		check_acl(&snapshot, self.directory.as_ref(), &requester, request)
	}

	/// Record a violation and hand the decision back.
	fn violation(&self, violation: Violation<'_>, decision: Decision) -> Decision {
		if let Decision::Deny(reason) = &decision {
			self.record(violation, reason);
		}
		decision
	}

	fn record(&self, violation: Violation<'_>, reason: &DenyReason) {
		debug!(gate = %violation.event, %reason, "privilege violation");

		let mut builder = AuditLogEntry::builder(violation.event)
			.severity(AuditSeverity::Error)
			.action(format!("Privilege violation: {}", violation.message));
		if let Some(actor) = violation.actor {
			builder = builder
				.actor(actor.name.as_str())
				.credentials(Some(actor.uid.to_string()), actor.euid.as_ref().map(ToString::to_string));
		}
		if let Some(operation) = violation.operation {
			builder = builder.operation(operation);
		}
		if let Some(path) = violation.path {
			builder = builder.path(path);
		}

		let mut details = violation.details;
		if let serde_json::Value::Object(map) = &mut details {
			map.insert("reason".to_string(), json!(reason));
		} else {
			details = json!({ "reason": reason });
		}
		self.audit.log(builder.details(details).build());
	}
}

/// What a denied gate call reports.
struct Violation<'a> {
	event: AuditEventType,
	message: String,
	actor: Option<&'a ObjectRef>,
	operation: Option<&'a str>,
	path: Option<&'a str>,
	details: serde_json::Value,
}

impl<'a> Violation<'a> {
	fn new(event: AuditEventType, message: String) -> Self {
		Self {
			event,
			message,
			actor: None,
			operation: None,
			path: None,
			details: serde_json::Value::Null,
		}
	}

	fn actor(mut self, actor: &'a ObjectRef) -> Self {
		self.actor = Some(actor);
		self
	}

	fn operation(mut self, operation: &'a str) -> Self {
		self.operation = Some(operation);
		self
	}

	fn path(mut self, path: &'a str) -> Self {
		self.path = Some(path);
		self
	}

	fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}
}


#[cfg(test)]
mod tests {
	use super::test_support::*;
	use super::*;

	#[test]
	fn settings_strip_program_suffixes() {
		let mut config = MasterConfig::default();
		config.objects.master = "/secure/obj/master.c".to_string();
		let settings = MasterSettings::from_config(&config);
		assert_eq!(settings.master, "/secure/obj/master");
		assert_eq!(settings.simul_efun, "/secure/obj/simul_efun");
		assert_eq!(settings.scratch_dir, "/tmp");
	}

	#[test]
	fn reload_audits_success() {
		let h = harness("/\n\topen\tALL\n", "", "");
		let report = h.master.reload_policy();
		assert_eq!(report.version, 2);
		assert_eq!(h.sink.count_of(AuditEventType::PolicyReloaded), 1);
	}

	#[test]
	fn reload_audits_each_failure() {
		let h = harness("", "", "");
		std::fs::write(&h.master.settings().sources.read_acl, "bogus\n").unwrap();
		std::fs::write(&h.master.settings().sources.privileges, "/x\tFLY\n").unwrap();

		let report = h.master.reload_policy();
		assert!(!report.is_complete());
		assert_eq!(h.sink.count_of(AuditEventType::PolicyLoadFailed), 2);
		assert_eq!(h.sink.count_of(AuditEventType::PolicyReloaded), 0);
	}

	#[test]
	fn privs_file_ignores_clone_and_extension() {
		let h = harness("", "", "/secure/daemons\tBIND\n");
		assert_eq!(h.master.privs_file("/secure/daemons/net.c"), Privileges::BIND);
		assert_eq!(h.master.privs_file("/secure/daemons/net#4"), Privileges::BIND);
		assert_eq!(h.master.privs_file("relative"), Privileges::empty());
	}

	#[test]
	fn ownership_helpers() {
		let h = harness("", "", "");
		assert_eq!(
			h.master.creator_file("/players/w/wiz1/obj/toy.c"),
			Credential::new("wiz1", "__Wizards__")
		);
		assert_eq!(h.master.author_file("/Domains/Ex/room.c"), UserId::from("Ex"));
		assert_eq!(h.master.domain_file("/std/room.c"), GroupId::backbone());
		assert_eq!(h.master.include_path("/secure/obj/master.c")[1], "/secure/include");
	}

	#[test]
	fn violations_carry_actor_and_reason() {
		let h = harness("", "", "");
		let tool = object("/players/b/bob/tool#2", "bob:__Mortals__");
		assert!(!h.master.valid_read("/secure/obj/master.c", &tool, "read_file").is_allowed());

		let entries = h.sink.entries();
		assert_eq!(entries.len(), 1);
		let entry = &entries[0];
		assert_eq!(entry.event_type, AuditEventType::ValidRead);
		assert_eq!(entry.actor.as_deref(), Some("/players/b/bob/tool#2"));
		assert_eq!(entry.actor_euid.as_deref(), Some("bob:__Mortals__"));
		assert_eq!(entry.path.as_deref(), Some("/secure/obj/master.c"));
		assert_eq!(entry.details["reason"], "no_matching_entry");
		assert!(entry.action.starts_with("Privilege violation: valid_read("));
	}
}
