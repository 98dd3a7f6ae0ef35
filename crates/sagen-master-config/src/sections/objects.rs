// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Well-known object paths and object-creation policy knobs.

use serde::{Deserialize, Serialize};

const DEFAULT_MASTER: &str = "/secure/obj/master";
const DEFAULT_SIMUL_EFUN: &str = "/secure/obj/simul_efun";
const DEFAULT_SCRATCH_DIR: &str = "/tmp";
const DEFAULT_SHADOW_SUFFIX: &str = "_shadow";

fn default_multi_instance() -> Vec<String> {
	vec![
		"/secure/obj/player/player".to_string(),
		"/secure/obj/player/login".to_string(),
	]
}

/// Object configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectsConfig {
	/// Program path of the monitor object itself.
	pub master: String,
	/// Program path of the trusted simul-efun object.
	pub simul_efun: String,
	/// World-writable tree in which no object may be created.
	pub scratch_dir: String,
	/// System-tree programs that may be instantiated more than once.
	pub multi_instance: Vec<String>,
	/// Required suffix of every shadow program's basename.
	pub shadow_suffix: String,
}

impl Default for ObjectsConfig {
	fn default() -> Self {
		ObjectsConfigLayer::default().finalize()
	}
}

/// Object configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectsConfigLayer {
	#[serde(default)]
	pub master: Option<String>,
	#[serde(default)]
	pub simul_efun: Option<String>,
	#[serde(default)]
	pub scratch_dir: Option<String>,
	#[serde(default)]
	pub multi_instance: Option<Vec<String>>,
	#[serde(default)]
	pub shadow_suffix: Option<String>,
}

impl ObjectsConfigLayer {
	pub fn merge(&mut self, other: ObjectsConfigLayer) {
		if other.master.is_some() {
			self.master = other.master;
		}
		if other.simul_efun.is_some() {
			self.simul_efun = other.simul_efun;
		}
		if other.scratch_dir.is_some() {
			self.scratch_dir = other.scratch_dir;
		}
		if other.multi_instance.is_some() {
			self.multi_instance = other.multi_instance;
		}
		if other.shadow_suffix.is_some() {
			self.shadow_suffix = other.shadow_suffix;
		}
	}

	pub fn finalize(self) -> ObjectsConfig {
		ObjectsConfig {
			master: self.master.unwrap_or_else(|| DEFAULT_MASTER.to_string()),
			simul_efun: self
				.simul_efun
				.unwrap_or_else(|| DEFAULT_SIMUL_EFUN.to_string()),
			scratch_dir: self
				.scratch_dir
				.unwrap_or_else(|| DEFAULT_SCRATCH_DIR.to_string()),
			multi_instance: self.multi_instance.unwrap_or_else(default_multi_instance),
			shadow_suffix: self
				.shadow_suffix
				.unwrap_or_else(|| DEFAULT_SHADOW_SUFFIX.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ObjectsConfig::default();
		assert_eq!(config.master, "/secure/obj/master");
		assert_eq!(config.simul_efun, "/secure/obj/simul_efun");
		assert_eq!(config.scratch_dir, "/tmp");
		assert_eq!(config.shadow_suffix, "_shadow");
		assert!(config
			.multi_instance
			.contains(&"/secure/obj/player/player".to_string()));
	}

	#[test]
	fn test_multi_instance_replaced_not_appended() {
		let mut base = ObjectsConfigLayer::default();
		base.merge(ObjectsConfigLayer {
			multi_instance: Some(vec!["/secure/obj/guest".to_string()]),
			..Default::default()
		});
		let config = base.finalize();
		assert_eq!(config.multi_instance, vec!["/secure/obj/guest".to_string()]);
	}

	#[test]
	fn test_deserialize_from_toml() {
		let layer: ObjectsConfigLayer = toml::from_str(
			r#"
master = "/adm/master"
shadow_suffix = "_sh"
"#,
		)
		.unwrap();
		assert_eq!(layer.master.as_deref(), Some("/adm/master"));
		assert_eq!(layer.shadow_suffix.as_deref(), Some("_sh"));
		assert!(layer.scratch_dir.is_none());
	}
}
