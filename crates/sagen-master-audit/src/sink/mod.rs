// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod file;
pub mod memory;
pub mod tracing;

use crate::event::{AuditLogEntry, AuditSeverity};

pub use crate::error::AuditSinkError;

/// A destination for audit records.
///
/// Sinks are called synchronously from the gate that produced the record, so
/// `publish` must not block for long.
pub trait AuditSink: Send + Sync {
	fn name(&self) -> &str;

	/// Records below this severity are not delivered to the sink.
	fn min_severity(&self) -> AuditSeverity {
		AuditSeverity::Debug
	}

	fn publish(&self, entry: &AuditLogEntry) -> Result<(), AuditSinkError>;
}
