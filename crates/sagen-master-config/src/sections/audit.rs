// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_MIN_SEVERITY: &str = "info";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditConfigLayer {
	pub enabled: Option<bool>,
	pub min_severity: Option<String>,
	pub tracing_sink: Option<bool>,
	pub file_sinks: Option<Vec<FileSinkConfigLayer>>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.min_severity.is_some() {
			self.min_severity = other.min_severity;
		}
		if other.tracing_sink.is_some() {
			self.tracing_sink = other.tracing_sink;
		}
		if other.file_sinks.is_some() {
			self.file_sinks = other.file_sinks;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		let min_severity = self
			.min_severity
			.unwrap_or_else(|| DEFAULT_MIN_SEVERITY.to_string());
		let file_sinks = self
			.file_sinks
			.map(|sinks| {
				sinks
					.into_iter()
					.filter_map(|s| s.finalize(&min_severity))
					.collect()
			})
			.unwrap_or_default();

		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			min_severity,
			tracing_sink: self.tracing_sink.unwrap_or(true),
			file_sinks,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
	pub enabled: bool,
	pub min_severity: String,
	/// Mirror every audit record into the tracing output.
	pub tracing_sink: bool,
	pub file_sinks: Vec<FileSinkConfig>,
}

impl Default for AuditConfig {
	fn default() -> Self {
		AuditConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
	#[default]
	JsonLines,
	/// `<timestamp> [<severity>]: '<message>'`, one record per line.
	Syslog,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileSinkConfigLayer {
	pub path: Option<String>,
	pub format: Option<FileFormat>,
	pub min_severity: Option<String>,
}

impl FileSinkConfigLayer {
	/// A sink without a path is dropped; its threshold defaults to the
	/// section-wide one.
	pub fn finalize(self, section_min_severity: &str) -> Option<FileSinkConfig> {
		let path = self.path?;

		Some(FileSinkConfig {
			path,
			format: self.format.unwrap_or_default(),
			min_severity: self
				.min_severity
				.unwrap_or_else(|| section_min_severity.to_string()),
		})
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileSinkConfig {
	pub path: String,
	pub format: FileFormat,
	pub min_severity: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn violations_go_to_tracing_by_default() {
		let config = AuditConfig::default();
		assert!(config.enabled && config.tracing_sink);
		assert_eq!(config.min_severity, "info");
		assert!(config.file_sinks.is_empty());
	}

	#[test]
	fn later_layer_wins_field_by_field() {
		let mut system: AuditConfigLayer = toml::from_str(
			r#"
			min_severity = "debug"
			tracing_sink = false
			"#,
		)
		.unwrap();
		let site: AuditConfigLayer = toml::from_str(
			r#"
			enabled = false
			[[file_sinks]]
			path = "/var/log/sagen/auth-%Y%m%d"
			format = "syslog"
			"#,
		)
		.unwrap();
		system.merge(site);

		let config = system.finalize();
		assert!(!config.enabled);
		assert!(!config.tracing_sink);
		assert_eq!(config.min_severity, "debug");
		assert_eq!(config.file_sinks[0].min_severity, "debug");
	}

	#[test]
	fn sink_without_path_is_dropped() {
		let layer = AuditConfigLayer {
			file_sinks: Some(vec![
				FileSinkConfigLayer::default(),
				FileSinkConfigLayer {
					path: Some("/var/log/auth".to_string()),
					..Default::default()
				},
			]),
			..Default::default()
		};
		let config = layer.finalize();
		assert_eq!(config.file_sinks.len(), 1);
		assert_eq!(config.file_sinks[0].path, "/var/log/auth");
		assert_eq!(config.file_sinks[0].format, FileFormat::JsonLines);
	}

	#[test]
	fn sink_inherits_section_severity() {
		let layer = AuditConfigLayer {
			min_severity: Some("error".to_string()),
			file_sinks: Some(vec![FileSinkConfigLayer {
				path: Some("/var/log/auth".to_string()),
				format: Some(FileFormat::Syslog),
				min_severity: None,
			}]),
			..Default::default()
		};
		let config = layer.finalize();
		assert_eq!(config.file_sinks[0].min_severity, "error");
		assert_eq!(config.file_sinks[0].format, FileFormat::Syslog);
	}

	#[test]
	fn formats_use_snake_case() {
		let json: FileFormat = serde_json::from_str(r#""json_lines""#).unwrap();
		assert_eq!(json, FileFormat::JsonLines);

		let syslog: FileFormat = serde_json::from_str(r#""syslog""#).unwrap();
		assert_eq!(syslog, FileFormat::Syslog);
	}
}
