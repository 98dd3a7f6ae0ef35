// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity changes and shadowing.

use sagen_master_audit::AuditEventType;
use serde_json::json;

use super::{Master, ObjectRef, Violation};
use crate::engine::{Decision, DenyReason, Grant};
use crate::ids::{Credential, NOBODY_GID, NOBODY_UID};
use crate::path::basename;
use crate::privileges::Privileges;

impl Master {
	/// May `actor` switch its effective credential to `target`?
	///
	/// Rules, first match wins:
	/// 1. back to its own uid, while no euid is set or with SETEUID
	/// 2. anything, while running as root
	/// 3. a live session into any group its user belongs to
	/// 4. down to the nobody user or group
	pub fn valid_seteuid(&self, actor: &ObjectRef, target: &Credential) -> Decision {
		let decision = self.seteuid_decision(actor, target);
		self.violation(
			Violation::new(
				AuditEventType::ValidSeteuid,
				format!(
					"valid_seteuid({actor}[{}/{}], \"{target}\")",
					actor.uid,
					actor.euid_display()
				),
			)
			.actor(actor)
			.operation("seteuid")
			.details(json!({ "target": target.to_string() })),
			decision,
		)
	}

	fn seteuid_decision(&self, actor: &ObjectRef, target: &Credential) -> Decision {
		if self.is_monitor(actor) {
			return Decision::Allow(Grant::Monitor);
		}

		let may_reclaim =
			actor.euid.is_none() || self.actor_privileges(actor).contains(Privileges::SETEUID);
		if may_reclaim && actor.uid == *target {
			return Decision::Allow(Grant::OwnIdentity);
		}

		if actor.euid.as_ref().is_some_and(|euid| euid.user.is_root()) {
			return Decision::Allow(Grant::RootIdentity);
		}

		if actor.interactive
			&& actor.uid.user == target.user
			&& target.is_resolved()
			&& self
				.directory
				.groups_of(actor.uid.user.as_str())
				.contains(&target.group)
		{
			return Decision::Allow(Grant::GroupMembership);
		}

		if target.user == NOBODY_UID || target.group == NOBODY_GID {
			return Decision::Allow(Grant::Downgrade);
		}

		Decision::Deny(DenyReason::IdentityChange)
	}

	/// May `shadow` shadow `target`?
	pub fn valid_shadow(&self, target: &ObjectRef, shadow: &ObjectRef) -> Decision {
		let decision = self.shadow_decision(target, shadow);
		self.violation(
			Violation::new(
				AuditEventType::ValidShadow,
				format!("valid_shadow({target}) by {shadow}"),
			)
			.actor(shadow)
			.operation("shadow")
			.path(&target.name),
			decision,
		)
	}

	fn shadow_decision(&self, target: &ObjectRef, shadow: &ObjectRef) -> Decision {
		if let Some(grant) = self.privileged_actor(shadow) {
			return Decision::Allow(grant);
		}
		if !basename(shadow.program()).ends_with(&self.settings.shadow_suffix) {
			return Decision::Deny(DenyReason::ShadowNaming);
		}
		if target.uid.user.is_root() {
			return Decision::Deny(DenyReason::ShadowRoot);
		}
		if self.shadow_hook.prevents_shadow(target, shadow) {
			return Decision::Deny(DenyReason::ShadowRefused);
		}
		Decision::Allow(Grant::ObjectPolicy)
	}
}
