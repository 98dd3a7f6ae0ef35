// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::MasterConfigLayer;
use crate::sections::{
	AuditConfigLayer, DatabaseConfigLayer, FileFormat, FileSinkConfigLayer, LoggingConfigLayer,
	ObjectsConfigLayer, PolicyConfigLayer,
};

/// Default location of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sagen/master.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<MasterConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<MasterConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(MasterConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<MasterConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(MasterConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: MasterConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SAGEN_MASTER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<MasterConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_from_lookup(&|name| std::env::var(name).ok())
	}
}

type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

fn load_from_lookup(lookup: &Lookup<'_>) -> Result<MasterConfigLayer, ConfigError> {
	let env = EnvReader { lookup };
	Ok(MasterConfigLayer {
		policy: Some(load_policy(&env)),
		objects: Some(load_objects(&env)),
		database: Some(load_database(&env)),
		logging: Some(load_logging(&env)?),
		audit: Some(load_audit(&env)?),
	})
}

struct EnvReader<'a> {
	lookup: &'a Lookup<'a>,
}

impl EnvReader<'_> {
	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		match self.var(name) {
			Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => Ok(Some(true)),
			Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => Ok(Some(false)),
			Some(v) => Err(ConfigError::invalid_value(
				name,
				format!("invalid boolean value '{v}'"),
			)),
			None => Ok(None),
		}
	}

	fn list(&self, name: &str) -> Option<Vec<String>> {
		self.var(name).map(|v| {
			v.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.collect()
		})
	}
}

fn load_policy(env: &EnvReader<'_>) -> PolicyConfigLayer {
	PolicyConfigLayer {
		mudlib_root: env.var("SAGEN_MASTER_POLICY_MUDLIB_ROOT").map(PathBuf::from),
		read_acl: env.var("SAGEN_MASTER_POLICY_READ_ACL"),
		write_acl: env.var("SAGEN_MASTER_POLICY_WRITE_ACL"),
		privileges: env.var("SAGEN_MASTER_POLICY_PRIVILEGES"),
		preloads: env.var("SAGEN_MASTER_POLICY_PRELOADS"),
	}
}

fn load_objects(env: &EnvReader<'_>) -> ObjectsConfigLayer {
	ObjectsConfigLayer {
		master: env.var("SAGEN_MASTER_OBJECTS_MASTER"),
		simul_efun: env.var("SAGEN_MASTER_OBJECTS_SIMUL_EFUN"),
		scratch_dir: env.var("SAGEN_MASTER_OBJECTS_SCRATCH_DIR"),
		multi_instance: env.list("SAGEN_MASTER_OBJECTS_MULTI_INSTANCE"),
		shadow_suffix: env.var("SAGEN_MASTER_OBJECTS_SHADOW_SUFFIX"),
	}
}

fn load_database(env: &EnvReader<'_>) -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		password: env.var("SAGEN_MASTER_DATABASE_PASSWORD"),
	}
}

fn load_logging(env: &EnvReader<'_>) -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env.var("SAGEN_MASTER_LOG_LEVEL"),
		json: env.bool("SAGEN_MASTER_LOG_JSON")?,
	})
}

fn load_audit(env: &EnvReader<'_>) -> Result<AuditConfigLayer, ConfigError> {
	let file_sinks = match env.var("SAGEN_MASTER_AUDIT_FILE") {
		Some(path) => {
			let format = match env.var("SAGEN_MASTER_AUDIT_FILE_FORMAT").as_deref() {
				None => None,
				Some("json_lines") | Some("json") => Some(FileFormat::JsonLines),
				Some("syslog") => Some(FileFormat::Syslog),
				Some(other) => {
					return Err(ConfigError::invalid_value(
						"SAGEN_MASTER_AUDIT_FILE_FORMAT",
						format!("unknown format '{other}'"),
					))
				}
			};
			Some(vec![FileSinkConfigLayer {
				path: Some(path),
				format,
				min_severity: None,
			}])
		}
		None => None,
	};

	Ok(AuditConfigLayer {
		enabled: env.bool("SAGEN_MASTER_AUDIT_ENABLED")?,
		min_severity: env.var("SAGEN_MASTER_AUDIT_MIN_SEVERITY"),
		tracing_sink: env.bool("SAGEN_MASTER_AUDIT_TRACING")?,
		file_sinks,
	})
}
