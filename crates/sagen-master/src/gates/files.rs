// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! File access, object creation and efun override gates.

use sagen_master_audit::AuditEventType;
use serde_json::json;

use super::{Master, ObjectCandidate, ObjectRef, Violation};
use crate::engine::{AccessRequest, Decision, DenyReason, Grant};
use crate::ownership::{author_of, creator_of};
use crate::path::{is_clone, is_within, program_of, segments};
use crate::privileges::Privileges;

const SYSTEM_TREE: &str = "/secure";

impl Master {
	/// May `actor` read `path` through `operation`?
	pub fn valid_read(&self, path: &str, actor: &ObjectRef, operation: &str) -> Decision {
		let decision = self.acl_decision(actor, &AccessRequest::read(path, operation));
		self.violation(
			Violation::new(
				AuditEventType::ValidRead,
				format!(
					"valid_read(\"{path}\", {actor}[{}], \"{operation}\")",
					actor.euid_display()
				),
			)
			.actor(actor)
			.operation(operation)
			.path(path),
			decision,
		)
	}

	/// May `actor` write `path` through `operation`?
	pub fn valid_write(&self, path: &str, actor: &ObjectRef, operation: &str) -> Decision {
		let decision = self.acl_decision(actor, &AccessRequest::write(path, operation));
		self.violation(
			Violation::new(
				AuditEventType::ValidWrite,
				format!(
					"valid_write(\"{path}\", {actor}[{}], \"{operation}\")",
					actor.euid_display()
				),
			)
			.actor(actor)
			.operation(operation)
			.path(path),
			decision,
		)
	}

	/// May `actor` make `to` a link to `from`? Needs read on `from` and
	/// write on `to`.
	pub fn valid_link(&self, from: &str, to: &str, actor: &ObjectRef) -> Decision {
		let decision = self.acl_decision(actor, &AccessRequest::link(from, to));
		self.violation(
			Violation::new(
				AuditEventType::ValidLink,
				format!(
					"valid_link(\"{from}\", \"{to}\") by {actor}[{}]",
					actor.euid_display()
				),
			)
			.actor(actor)
			.operation("ln")
			.path(from)
			.details(json!({ "to": to })),
			decision,
		)
	}

	/// May `candidate` exist? Called after loading and before the object
	/// runs any code. `session` is the live session driving the load, if
	/// any.
	pub fn valid_object(&self, candidate: &ObjectCandidate, session: Option<&ObjectRef>) -> Decision {
		let decision = self.object_decision(candidate, session);
		let message = match session {
			Some(session) => format!("valid_object({}) by {session}", candidate.name),
			None => format!("valid_object({})", candidate.name),
		};
		let mut violation = Violation::new(AuditEventType::ValidObject, message)
			.path(&candidate.name)
			.details(json!({ "requires_session": candidate.requires_session }));
		if let Some(session) = session {
			violation = violation.actor(session);
		}
		self.violation(violation, decision)
	}

	fn object_decision(&self, candidate: &ObjectCandidate, session: Option<&ObjectRef>) -> Decision {
		let program = program_of(&candidate.name);
		let Some(segs) = segments(program) else {
			return Decision::Deny(DenyReason::MalformedRequest);
		};
		if segs.iter().any(|s| s.starts_with('.')) {
			return Decision::Deny(DenyReason::HiddenPath);
		}
		if is_within(program, &self.settings.scratch_dir) {
			return Decision::Deny(DenyReason::ScratchTree);
		}
		if creator_of(program, self.directory.as_ref()).is_unknown() {
			return Decision::Deny(DenyReason::UnknownOwnership);
		}

		let in_system_tree = is_within(program, SYSTEM_TREE);
		if in_system_tree
			&& is_clone(&candidate.name)
			&& !self.settings.multi_instance.iter().any(|p| p == program)
		{
			return Decision::Deny(DenyReason::SingleInstance);
		}

		if candidate.requires_session {
			let Some(session) = session.filter(|s| s.interactive) else {
				return Decision::Deny(DenyReason::RequiresSession);
			};
			if !in_system_tree && author_of(program) != session.uid.user {
				return Decision::Deny(DenyReason::RequiresSession);
			}
		}

		Decision::Allow(Grant::ObjectPolicy)
	}

	/// May `mainfile` compile an `efun::` call to `efun`? `file` is where the
	/// call appears, which differs from `mainfile` for included code.
	pub fn valid_override(&self, file: &str, efun: &str, mainfile: &str) -> Decision {
		let program = program_of(mainfile);
		let decision = if segments(mainfile).is_none() {
			Decision::Deny(DenyReason::MalformedRequest)
		} else if program == self.settings.master {
			Decision::Allow(Grant::Monitor)
		} else if program == self.settings.simul_efun {
			Decision::Allow(Grant::TrustedSubsystem)
		} else if is_within(mainfile, SYSTEM_TREE) {
			Decision::Allow(Grant::RootIdentity)
		} else if self.privs_file(mainfile).contains(Privileges::OVERRIDE) {
			Decision::Allow(Grant::Privilege(Privileges::OVERRIDE))
		} else {
			Decision::Deny(DenyReason::MissingPrivilege(Privileges::OVERRIDE))
		};

		self.violation(
			Violation::new(
				AuditEventType::ValidOverride,
				format!("valid_override(\"{file}\", \"{efun}\", \"{mainfile}\")"),
			)
			.operation(efun)
			.path(mainfile)
			.details(json!({ "file": file })),
			decision,
		)
	}
}
