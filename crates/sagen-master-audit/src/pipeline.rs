// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use sagen_master_config::AuditConfig;
use tracing::{instrument, warn};

use crate::error::{AuditError, AuditResult};
use crate::event::{AuditLogEntry, AuditSeverity};
use crate::sink::file::FileAuditSink;
use crate::sink::tracing::TracingAuditSink;
use crate::sink::AuditSink;

/// Fans audit records out to every configured sink.
///
/// Delivery is synchronous and best-effort: a failing sink is reported through
/// `tracing` and never affects the gate that produced the record.
pub struct AuditService {
	enabled: bool,
	min_severity: AuditSeverity,
	sinks: Vec<Arc<dyn AuditSink>>,
}

impl AuditService {
	pub fn new(min_severity: AuditSeverity, sinks: Vec<Arc<dyn AuditSink>>) -> Self {
		Self {
			enabled: true,
			min_severity,
			sinks,
		}
	}

	/// A service that drops everything.
	pub fn disabled() -> Self {
		Self {
			enabled: false,
			min_severity: AuditSeverity::Critical,
			sinks: Vec::new(),
		}
	}

	/// Build the sinks named by the `[audit]` config section.
	pub fn from_config(config: &AuditConfig) -> AuditResult<Self> {
		if !config.enabled {
			return Ok(Self::disabled());
		}

		let min_severity: AuditSeverity = config
			.min_severity
			.parse()
			.map_err(|e| AuditError::ConfigError(format!("audit.min_severity: {e}")))?;

		let mut sinks: Vec<Arc<dyn AuditSink>> = Vec::new();
		if config.tracing_sink {
			sinks.push(Arc::new(TracingAuditSink::new(min_severity)));
		}
		for sink_config in &config.file_sinks {
			let sink = FileAuditSink::from_config(sink_config).map_err(|e| AuditError::SinkError {
				sink: format!("file:{}", sink_config.path),
				source: e,
			})?;
			sinks.push(Arc::new(sink));
		}

		Ok(Self::new(min_severity, sinks))
	}

	/// Attach another sink after construction.
	pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
		self.sinks.push(sink);
		self
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn sink_count(&self) -> usize {
		self.sinks.len()
	}

	/// Deliver a record to every sink whose threshold it meets.
	///
	/// Returns the number of sinks that accepted the record.
	#[instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub fn log(&self, entry: AuditLogEntry) -> usize {
		if !self.enabled || entry.severity < self.min_severity {
			return 0;
		}

		let mut delivered = 0;
		for sink in &self.sinks {
			if entry.severity < sink.min_severity() {
				continue;
			}
			match sink.publish(&entry) {
				Ok(()) => delivered += 1,
				Err(e) => warn!(sink = sink.name(), error = %e, "audit sink publish failed"),
			}
		}
		delivered
	}
}

impl Default for AuditService {
	fn default() -> Self {
		Self::new(
			AuditSeverity::Debug,
			vec![Arc::new(TracingAuditSink::default())],
		)
	}
}
