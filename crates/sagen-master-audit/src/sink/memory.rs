// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use parking_lot::Mutex;

use crate::error::AuditSinkError;
use crate::event::{AuditEventType, AuditLogEntry, AuditSeverity};
use crate::sink::AuditSink;

/// Keeps every published record in memory. Used by tests and by the CLI to
/// report denials after a one-shot check.
pub struct MemoryAuditSink {
	min_severity: AuditSeverity,
	entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditSink {
	pub fn new() -> Self {
		Self {
			min_severity: AuditSeverity::Debug,
			entries: Mutex::new(Vec::new()),
		}
	}

	pub fn with_min_severity(min_severity: AuditSeverity) -> Self {
		Self {
			min_severity,
			entries: Mutex::new(Vec::new()),
		}
	}

	/// Snapshot of everything published so far.
	pub fn entries(&self) -> Vec<AuditLogEntry> {
		self.entries.lock().clone()
	}

	pub fn count_of(&self, event_type: AuditEventType) -> usize {
		self
			.entries
			.lock()
			.iter()
			.filter(|e| e.event_type == event_type)
			.count()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	pub fn clear(&self) {
		self.entries.lock().clear();
	}
}

impl Default for MemoryAuditSink {
	fn default() -> Self {
		Self::new()
	}
}

impl AuditSink for MemoryAuditSink {
	fn name(&self) -> &str {
		"memory"
	}

	fn min_severity(&self) -> AuditSeverity {
		self.min_severity
	}

	fn publish(&self, entry: &AuditLogEntry) -> Result<(), AuditSinkError> {
		self.entries.lock().push(entry.clone());
		Ok(())
	}
}
