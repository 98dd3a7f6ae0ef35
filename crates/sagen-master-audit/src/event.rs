// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit event types and log entries.
//!
//! - [`AuditEventType`]: which gate (or policy lifecycle step) produced the record
//! - [`AuditSeverity`]: RFC 5424-compatible severity levels
//! - [`AuditFacility`]: syslog-style facility the record is filed under
//! - [`AuditLogEntry`]: complete audit record
//! - [`AuditLogBuilder`]: fluent API for constructing entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The gate or policy step a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	// Gate denials
	ValidRead,
	ValidWrite,
	ValidLink,
	ValidObject,
	ValidSeteuid,
	ValidShadow,
	ValidBind,
	ValidDatabase,
	ValidHide,
	ValidSocket,
	ValidOverride,

	// Policy lifecycle
	PolicyReloaded,
	PolicyLoadFailed,
}

impl AuditEventType {
	/// Severity used when the record does not set one.
	pub fn default_severity(&self) -> AuditSeverity {
		match self {
			AuditEventType::PolicyReloaded => AuditSeverity::Info,
			AuditEventType::PolicyLoadFailed => AuditSeverity::Warning,
			_ => AuditSeverity::Error,
		}
	}

	/// Returns the facility records of this type are filed under.
	pub fn facility(&self) -> AuditFacility {
		match self {
			AuditEventType::PolicyReloaded | AuditEventType::PolicyLoadFailed => AuditFacility::Kern,
			_ => AuditFacility::Auth,
		}
	}
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditEventType::ValidRead => "valid_read",
			AuditEventType::ValidWrite => "valid_write",
			AuditEventType::ValidLink => "valid_link",
			AuditEventType::ValidObject => "valid_object",
			AuditEventType::ValidSeteuid => "valid_seteuid",
			AuditEventType::ValidShadow => "valid_shadow",
			AuditEventType::ValidBind => "valid_bind",
			AuditEventType::ValidDatabase => "valid_database",
			AuditEventType::ValidHide => "valid_hide",
			AuditEventType::ValidSocket => "valid_socket",
			AuditEventType::ValidOverride => "valid_override",
			AuditEventType::PolicyReloaded => "policy_reloaded",
			AuditEventType::PolicyLoadFailed => "policy_load_failed",
		};
		write!(f, "{s}")
	}
}

/// Severity levels for audit events.
///
/// The numeric values correspond to syslog severity codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
	Debug = 7,
	#[default]
	Info = 6,
	Notice = 5,
	Warning = 4,
	Error = 3,
	Critical = 2,
}

impl AuditSeverity {
	/// Numeric syslog severity.
	pub fn as_syslog_code(&self) -> u8 {
		*self as u8
	}
}

impl PartialOrd for AuditSeverity {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for AuditSeverity {
	fn cmp(&self, other: &Self) -> Ordering {
		// Lower numeric value = higher severity (Critical=2 > Debug=7)
		(*other as u8).cmp(&(*self as u8))
	}
}

impl fmt::Display for AuditSeverity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditSeverity::Debug => "debug",
			AuditSeverity::Info => "info",
			AuditSeverity::Notice => "notice",
			AuditSeverity::Warning => "warning",
			AuditSeverity::Error => "error",
			AuditSeverity::Critical => "critical",
		};
		write!(f, "{s}")
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audit severity '{0}'")]
pub struct UnknownSeverity(pub String);

impl FromStr for AuditSeverity {
	type Err = UnknownSeverity;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"debug" => Ok(AuditSeverity::Debug),
			"info" => Ok(AuditSeverity::Info),
			"notice" => Ok(AuditSeverity::Notice),
			"warning" | "warn" => Ok(AuditSeverity::Warning),
			"error" | "err" => Ok(AuditSeverity::Error),
			"critical" | "crit" => Ok(AuditSeverity::Critical),
			_ => Err(UnknownSeverity(s.to_string())),
		}
	}
}

/// Syslog-style facility. Only the privileged facilities the monitor writes to
/// are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditFacility {
	/// Reserved for the monitor itself.
	Kern,
	/// Security/authorization messages.
	Auth,
}

impl fmt::Display for AuditFacility {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AuditFacility::Kern => write!(f, "kern"),
			AuditFacility::Auth => write!(f, "auth"),
		}
	}
}

/// One audit record: a privilege violation or a policy reload outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
	/// Record id.
	pub id: Uuid,
	/// When the event occurred.
	pub timestamp: DateTime<Utc>,
	/// The type of event.
	pub event_type: AuditEventType,
	pub severity: AuditSeverity,
	pub facility: AuditFacility,

	/// Object name of the acting object (`/players/w/wiz/tool#12`), if any.
	pub actor: Option<String>,
	/// Base credential of the actor, rendered `user:group`.
	pub actor_uid: Option<String>,
	/// Effective credential of the actor, rendered `user:group`.
	pub actor_euid: Option<String>,

	/// The operation that was attempted (efun or sub-operation name).
	pub operation: Option<String>,
	/// The path the operation targeted.
	pub path: Option<String>,

	/// Human-readable description of the event.
	pub action: String,
	/// Additional event-specific details (remaining gate arguments).
	pub details: serde_json::Value,
}

impl AuditLogEntry {
	pub fn builder(event_type: AuditEventType) -> AuditLogBuilder {
		AuditLogBuilder::new(event_type)
	}
}

/// Builds an [`AuditLogEntry`].
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
	event_type: AuditEventType,
	severity: Option<AuditSeverity>,
	actor: Option<String>,
	actor_uid: Option<String>,
	actor_euid: Option<String>,
	operation: Option<String>,
	path: Option<String>,
	action: Option<String>,
	details: serde_json::Value,
}

impl AuditLogBuilder {
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			severity: None,
			actor: None,
			actor_uid: None,
			actor_euid: None,
			operation: None,
			path: None,
			action: None,
			details: serde_json::Value::Null,
		}
	}

	/// Defaults to [`AuditEventType::default_severity`].
	pub fn severity(mut self, severity: AuditSeverity) -> Self {
		self.severity = Some(severity);
		self
	}

	/// Set the acting object's name.
	pub fn actor(mut self, name: impl Into<String>) -> Self {
		self.actor = Some(name.into());
		self
	}

	/// Set the actor's base and effective credentials.
	pub fn credentials(mut self, uid: Option<String>, euid: Option<String>) -> Self {
		self.actor_uid = uid;
		self.actor_euid = euid;
		self
	}

	pub fn operation(mut self, operation: impl Into<String>) -> Self {
		self.operation = Some(operation.into());
		self
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	/// The message line written to syslog-style sinks.
	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	/// Build the audit log entry.
	pub fn build(self) -> AuditLogEntry {
		AuditLogEntry {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			severity: self
				.severity
				.unwrap_or_else(|| self.event_type.default_severity()),
			facility: self.event_type.facility(),
			actor: self.actor,
			actor_uid: self.actor_uid,
			actor_euid: self.actor_euid,
			operation: self.operation,
			path: self.path,
			action: self.action.unwrap_or_else(|| self.event_type.to_string()),
			details: self.details,
		}
	}
}
