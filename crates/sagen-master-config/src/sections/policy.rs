// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy file locations (ACL tables, privilege table, preload list).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_MUDLIB_ROOT: &str = "./lib";
const DEFAULT_READ_ACL: &str = "/var/cfg/Read.acl";
const DEFAULT_WRITE_ACL: &str = "/var/cfg/Write.acl";
const DEFAULT_PRIVILEGES: &str = "/var/cfg/Privs.cfg";
const DEFAULT_PRELOADS: &str = "/var/cfg/PRELOADS";

/// Policy configuration (runtime, fully resolved).
///
/// The table locations are mudlib paths; [`PolicyConfig::host_path`] maps
/// them below `mudlib_root` on the host filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
	pub mudlib_root: PathBuf,
	pub read_acl: String,
	pub write_acl: String,
	pub privileges: String,
	pub preloads: String,
}

impl PolicyConfig {
	/// Resolve a mudlib path (`/var/cfg/Read.acl`) to a host path.
	pub fn host_path(&self, mud_path: &str) -> PathBuf {
		join_mudlib(&self.mudlib_root, mud_path)
	}

	pub fn read_acl_path(&self) -> PathBuf {
		self.host_path(&self.read_acl)
	}

	pub fn write_acl_path(&self) -> PathBuf {
		self.host_path(&self.write_acl)
	}

	pub fn privileges_path(&self) -> PathBuf {
		self.host_path(&self.privileges)
	}

	pub fn preloads_path(&self) -> PathBuf {
		self.host_path(&self.preloads)
	}
}

fn join_mudlib(root: &Path, mud_path: &str) -> PathBuf {
	let relative = mud_path.trim_start_matches('/');
	root.join(relative)
}

impl Default for PolicyConfig {
	fn default() -> Self {
		PolicyConfigLayer::default().finalize()
	}
}

/// Policy configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfigLayer {
	#[serde(default)]
	pub mudlib_root: Option<PathBuf>,
	#[serde(default)]
	pub read_acl: Option<String>,
	#[serde(default)]
	pub write_acl: Option<String>,
	#[serde(default)]
	pub privileges: Option<String>,
	#[serde(default)]
	pub preloads: Option<String>,
}

impl PolicyConfigLayer {
	pub fn merge(&mut self, other: PolicyConfigLayer) {
		if other.mudlib_root.is_some() {
			self.mudlib_root = other.mudlib_root;
		}
		if other.read_acl.is_some() {
			self.read_acl = other.read_acl;
		}
		if other.write_acl.is_some() {
			self.write_acl = other.write_acl;
		}
		if other.privileges.is_some() {
			self.privileges = other.privileges;
		}
		if other.preloads.is_some() {
			self.preloads = other.preloads;
		}
	}

	pub fn finalize(self) -> PolicyConfig {
		PolicyConfig {
			mudlib_root: self
				.mudlib_root
				.unwrap_or_else(|| PathBuf::from(DEFAULT_MUDLIB_ROOT)),
			read_acl: self.read_acl.unwrap_or_else(|| DEFAULT_READ_ACL.to_string()),
			write_acl: self
				.write_acl
				.unwrap_or_else(|| DEFAULT_WRITE_ACL.to_string()),
			privileges: self
				.privileges
				.unwrap_or_else(|| DEFAULT_PRIVILEGES.to_string()),
			preloads: self.preloads.unwrap_or_else(|| DEFAULT_PRELOADS.to_string()),
		}
	}
}
