// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Gates decided by the privilege table.

use sagen_master_audit::AuditEventType;
use serde::Serialize;
use serde_json::json;

use super::{Master, ObjectRef, Violation};
use crate::engine::{Decision, DenyReason, Grant};
use crate::privileges::Privileges;

/// Answer to `valid_database`. A granted `connect` carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseDecision {
	Allow(Grant),
	Connect { password: String },
	Deny(DenyReason),
}

impl DatabaseDecision {
	pub fn is_allowed(&self) -> bool {
		!matches!(self, DatabaseDecision::Deny(_))
	}
}

impl From<Decision> for DatabaseDecision {
	fn from(decision: Decision) -> Self {
		match decision {
			Decision::Allow(grant) => DatabaseDecision::Allow(grant),
			Decision::Deny(reason) => DatabaseDecision::Deny(reason),
		}
	}
}

/// Privileges that unlock a socket efun, any one of them sufficing.
fn socket_privileges(func: &str) -> Option<Privileges> {
	match func {
		"accept" | "listen" => Some(Privileges::SOCKET_SERVER),
		"connect" => Some(Privileges::SOCKET_CLIENT),
		"acquire" | "bind" | "create" | "close" | "release" | "write" => {
			Some(Privileges::SOCKET_SERVER | Privileges::SOCKET_CLIENT)
		}
		_ => None,
	}
}

impl Master {
	/// Grant `required` if `actor` is a trusted caller or holds any of it.
	fn privilege_decision(&self, actor: &ObjectRef, required: Privileges) -> Decision {
		if let Some(grant) = self.trusted_caller(actor) {
			return Decision::Allow(grant);
		}
		let held = self.actor_privileges(actor) & required;
		if held.is_empty() {
			Decision::Deny(DenyReason::MissingPrivilege(required))
		} else {
			Decision::Allow(Grant::Privilege(held))
		}
	}

	/// May `doer` bind a function owned by `owner` to `victim`?
	pub fn valid_bind(&self, doer: &ObjectRef, owner: &ObjectRef, victim: &ObjectRef) -> Decision {
		let decision = self.privilege_decision(doer, Privileges::BIND);
		self.violation(
			Violation::new(
				AuditEventType::ValidBind,
				format!("valid_bind({doer}, {owner}, {victim})"),
			)
			.actor(doer)
			.operation("bind")
			.details(json!({ "owner": owner.name, "victim": victim.name })),
			decision,
		)
	}

	/// May `doer` perform database `action`? Only the monitor opens and
	/// closes connections.
	pub fn valid_database(&self, doer: &ObjectRef, action: &str, info: &[String]) -> DatabaseDecision {
		let decision = match action {
			"connect" | "close" if !self.is_monitor(doer) => {
				DatabaseDecision::Deny(DenyReason::MonitorOnly)
			}
			"connect" => match &self.settings.database_password {
				Some(password) => DatabaseDecision::Connect {
					password: password.clone(),
				},
				None => DatabaseDecision::Allow(Grant::Monitor),
			},
			"close" => DatabaseDecision::Allow(Grant::Monitor),
			_ => self.privilege_decision(doer, Privileges::DATABASE).into(),
		};

		if let DatabaseDecision::Deny(reason) = &decision {
			self.record(
				Violation::new(
					AuditEventType::ValidDatabase,
					format!("valid_database({doer}, \"{action}\", {info:?})"),
				)
				.actor(doer)
				.operation(action)
				.details(json!({ "info": info })),
				reason,
			);
		}
		decision
	}

	/// May `ob` hide, or see hidden objects?
	pub fn valid_hide(&self, ob: &ObjectRef) -> Decision {
		let decision = self.privilege_decision(ob, Privileges::HIDE);
		self.violation(
			Violation::new(AuditEventType::ValidHide, format!("valid_hide({ob})"))
				.actor(ob)
				.operation("set_hide"),
			decision,
		)
	}

	/// May `ob` call the socket efun `func`? `info` carries the efun's
	/// descriptor, owner, address and port, as far as they apply.
	pub fn valid_socket(&self, ob: &ObjectRef, func: &str, info: &[String]) -> Decision {
		let decision = match (self.trusted_caller(ob), socket_privileges(func)) {
			(Some(grant), _) => Decision::Allow(grant),
			(None, Some(required)) => self.privilege_decision(ob, required),
			(None, None) => Decision::Deny(DenyReason::UnknownSocketFunction(func.to_string())),
		};
		self.violation(
			Violation::new(
				AuditEventType::ValidSocket,
				format!("valid_socket({ob}, \"{func}\", {info:?})"),
			)
			.actor(ob)
			.operation(func)
			.details(json!({ "info": info })),
			decision,
		)
	}
}
