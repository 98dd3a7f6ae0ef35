// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the sagen-master reference monitor.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`SAGEN_MASTER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use sagen_master_config::load_config;
//!
//! let config = load_config()?;
//! println!("read ACL at {}", config.policy.read_acl_path().display());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::MasterConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved monitor configuration.
#[derive(Debug, Clone, Default)]
pub struct MasterConfig {
	pub policy: PolicyConfig,
	pub objects: ObjectsConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub audit: AuditConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SAGEN_MASTER_*`)
/// 2. Config file (`/etc/sagen/master.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<MasterConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<MasterConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<MasterConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = MasterConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: MasterConfigLayer) -> Result<MasterConfig, ConfigError> {
	let policy = layer.policy.unwrap_or_default().finalize();
	let objects = layer.objects.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let audit = layer.audit.unwrap_or_default().finalize();

	validate_config(&objects)?;

	info!(
		mudlib_root = %policy.mudlib_root.display(),
		read_acl = %policy.read_acl,
		write_acl = %policy.write_acl,
		privileges = %policy.privileges,
		master = %objects.master,
		audit_enabled = audit.enabled,
		audit_file_sinks = audit.file_sinks.len(),
		database_password_configured = database.password.is_some(),
		"Monitor configuration loaded"
	);

	Ok(MasterConfig {
		policy,
		objects,
		database,
		logging,
		audit,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(objects: &ObjectsConfig) -> Result<(), ConfigError> {
	for (key, value) in [
		("objects.master", &objects.master),
		("objects.simul_efun", &objects.simul_efun),
		("objects.scratch_dir", &objects.scratch_dir),
	] {
		if !value.starts_with('/') {
			return Err(ConfigError::validation(format!(
				"{key} must be an absolute mudlib path, got '{value}'"
			)));
		}
	}

	if objects.master == objects.simul_efun {
		return Err(ConfigError::validation(
			"objects.master and objects.simul_efun name the same program",
		));
	}

	if objects.shadow_suffix.is_empty() {
		return Err(ConfigError::validation(
			"objects.shadow_suffix must not be empty",
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_defaults_validate() {
		assert!(validate_config(&ObjectsConfig::default()).is_ok());
	}

	#[test]
	fn test_relative_master_rejected() {
		let objects = ObjectsConfig {
			master: "secure/obj/master".to_string(),
			..Default::default()
		};
		let result = validate_config(&objects);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("objects.master"));
	}

	#[test]
	fn test_master_equal_to_simul_efun_rejected() {
		let objects = ObjectsConfig {
			simul_efun: "/secure/obj/master".to_string(),
			..Default::default()
		};
		assert!(validate_config(&objects).is_err());
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[objects]\nscratch_dir = \"/scratch\"\n\n[audit]\nenabled = false"
		)
		.unwrap();

		let config =
			load_from_sources(vec![Box::new(TomlSource::new(file.path())), Box::new(DefaultsSource)])
				.unwrap();
		assert_eq!(config.objects.scratch_dir, "/scratch");
		assert_eq!(config.objects.master, "/secure/obj/master");
		assert!(!config.audit.enabled);
	}

	#[test]
	fn test_invalid_file_fails_load() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[objects]\nmaster = \"relative\"").unwrap();
		let result = load_from_sources(vec![Box::new(TomlSource::new(file.path()))]);
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}
}
