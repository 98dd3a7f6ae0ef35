// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::error::AuditSinkError;
use crate::event::{AuditLogEntry, AuditSeverity};
use crate::sink::AuditSink;

/// Mirrors audit records into the `tracing` output under the
/// `sagen_master::audit` target.
pub struct TracingAuditSink {
	min_severity: AuditSeverity,
}

impl TracingAuditSink {
	pub fn new(min_severity: AuditSeverity) -> Self {
		Self { min_severity }
	}
}

impl Default for TracingAuditSink {
	fn default() -> Self {
		Self::new(AuditSeverity::Debug)
	}
}

impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		"tracing"
	}

	fn min_severity(&self) -> AuditSeverity {
		self.min_severity
	}

	fn publish(&self, entry: &AuditLogEntry) -> Result<(), AuditSinkError> {
		macro_rules! emit {
			($level:ident) => {
				tracing::$level!(
					target: "sagen_master::audit",
					audit_id = %entry.id,
					event_type = %entry.event_type,
					facility = %entry.facility,
					severity = %entry.severity,
					actor = entry.actor.as_deref().unwrap_or("-"),
					uid = entry.actor_uid.as_deref().unwrap_or("-"),
					euid = entry.actor_euid.as_deref().unwrap_or("-"),
					operation = entry.operation.as_deref().unwrap_or("-"),
					path = entry.path.as_deref().unwrap_or("-"),
					details = %entry.details,
					"{}",
					entry.action
				)
			};
		}

		match entry.severity {
			AuditSeverity::Critical | AuditSeverity::Error => emit!(error),
			AuditSeverity::Warning => emit!(warn),
			AuditSeverity::Notice | AuditSeverity::Info => emit!(info),
			AuditSeverity::Debug => emit!(debug),
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::AuditEventType;

	#[test]
	fn publish_never_fails() {
		let sink = TracingAuditSink::default();
		let entry = AuditLogEntry::builder(AuditEventType::ValidRead)
			.path("/secure/etc/passwd")
			.build();
		assert!(sink.publish(&entry).is_ok());
		assert_eq!(sink.name(), "tracing");
	}
}
