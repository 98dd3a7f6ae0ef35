// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Datelike, Local, Utc};
use parking_lot::Mutex;
use sagen_master_config::{FileFormat, FileSinkConfig};

use crate::error::AuditSinkError;
use crate::event::{AuditLogEntry, AuditSeverity};
use crate::sink::AuditSink;

struct FileHandle {
	path: String,
	file: File,
}

/// Appends audit records to a file, one per line.
///
/// The path may contain `%Y`, `%m` and `%d`; the file is reopened when the
/// expanded name changes.
pub struct FileAuditSink {
	path: String,
	format: FileFormat,
	min_severity: AuditSeverity,
	handle: Mutex<Option<FileHandle>>,
}

impl FileAuditSink {
	pub fn new(path: impl Into<String>, format: FileFormat, min_severity: AuditSeverity) -> Self {
		Self {
			path: path.into(),
			format,
			min_severity,
			handle: Mutex::new(None),
		}
	}

	pub fn from_config(config: &FileSinkConfig) -> Result<Self, AuditSinkError> {
		let min_severity = config
			.min_severity
			.parse()
			.map_err(|e| AuditSinkError::Permanent(format!("{e}")))?;
		Ok(Self::new(config.path.clone(), config.format, min_severity))
	}

	fn write_line(&self, line: &str) -> Result<(), AuditSinkError> {
		let expanded = expand_path(&self.path, Utc::now());
		let mut guard = self.handle.lock();

		let needs_reopen = match &*guard {
			Some(handle) => handle.path != expanded,
			None => true,
		};

		if needs_reopen {
			let file = open_append(Path::new(&expanded))?;
			*guard = Some(FileHandle {
				path: expanded,
				file,
			});
		}

		let handle = guard
			.as_mut()
			.ok_or_else(|| AuditSinkError::Permanent("file handle not initialized".to_string()))?;

		handle
			.file
			.write_all(line.as_bytes())
			.map_err(|e| AuditSinkError::Transient(format!("failed to write to file: {e}")))?;
		handle
			.file
			.flush()
			.map_err(|e| AuditSinkError::Transient(format!("failed to flush file: {e}")))
	}
}

fn open_append(path: &Path) -> Result<File, AuditSinkError> {
	OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|e| AuditSinkError::Transient(format!("failed to open {}: {e}", path.display())))
}

impl AuditSink for FileAuditSink {
	fn name(&self) -> &str {
		"file"
	}

	fn min_severity(&self) -> AuditSeverity {
		self.min_severity
	}

	fn publish(&self, entry: &AuditLogEntry) -> Result<(), AuditSinkError> {
		let line = match self.format {
			FileFormat::JsonLines => format_json_line(entry)?,
			FileFormat::Syslog => format_syslog_line(entry),
		};
		self.write_line(&line)
	}
}

pub fn format_json_line(entry: &AuditLogEntry) -> Result<String, AuditSinkError> {
	let json = serde_json::to_string(entry)
		.map_err(|e| AuditSinkError::Permanent(format!("JSON serialization failed: {e}")))?;
	Ok(format!("{json}\n"))
}

/// `<ctime> [<facility>.<severity>]: '<message>'`
pub fn format_syslog_line(entry: &AuditLogEntry) -> String {
	let local: DateTime<Local> = entry.timestamp.with_timezone(&Local);
	let message = entry.action.replace(['\n', '\r'], " ");
	format!(
		"{} [{}.{}]: '{}'\n",
		local.format("%a %b %e %H:%M:%S %Y"),
		entry.facility,
		entry.severity,
		message
	)
}

pub fn expand_path(path: &str, now: DateTime<Utc>) -> String {
	path
		.replace("%Y", &format!("{:04}", now.year()))
		.replace("%m", &format!("{:02}", now.month()))
		.replace("%d", &format!("{:02}", now.day()))
}
