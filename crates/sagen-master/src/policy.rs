// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Versioned policy snapshots and atomic reload.
//!
//! A [`PolicySnapshot`] is immutable once built. [`PolicyStore::reload`]
//! parses every table first and only then swaps the active snapshot, so a
//! reader sees either the previous snapshot or the new one in full. A table
//! that fails to load is installed empty, which denies everything it governs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sagen_master_config::PolicyConfig;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::acl::{parse_acl, AclTable};
use crate::engine::AccessKind;
use crate::error::PolicyLoadError;
use crate::privileges::{parse_privileges, PrivilegeTable};

/// One immutable generation of the policy tables.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
	/// 0 for the unloaded snapshot; incremented by every reload.
	pub version: u64,
	pub read_acl: AclTable,
	pub write_acl: AclTable,
	pub privileges: PrivilegeTable,
	pub loaded_at: Option<DateTime<Utc>>,
}

impl PolicySnapshot {
	/// The state before the first load: every table empty.
	pub fn unloaded() -> Self {
		Self {
			version: 0,
			read_acl: AclTable::empty(),
			write_acl: AclTable::empty(),
			privileges: PrivilegeTable::empty(),
			loaded_at: None,
		}
	}

	pub fn is_loaded(&self) -> bool {
		self.version > 0
	}

	pub fn acl(&self, kind: AccessKind) -> &AclTable {
		match kind {
			AccessKind::Read => &self.read_acl,
			AccessKind::Write => &self.write_acl,
		}
	}
}

/// Host paths of the three policy files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySources {
	pub read_acl: PathBuf,
	pub write_acl: PathBuf,
	pub privileges: PathBuf,
}

impl PolicySources {
	pub fn from_config(config: &PolicyConfig) -> Self {
		Self {
			read_acl: config.read_acl_path(),
			write_acl: config.write_acl_path(),
			privileges: config.privileges_path(),
		}
	}
}

/// Outcome of loading one table.
#[derive(Debug, Serialize)]
pub struct TableReport {
	pub path: PathBuf,
	/// Number of path patterns installed.
	pub patterns: usize,
	/// Why the table was installed empty, if it was.
	#[serde(serialize_with = "serialize_error")]
	pub error: Option<PolicyLoadError>,
}

fn serialize_error<S: serde::Serializer>(
	error: &Option<PolicyLoadError>,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	match error {
		Some(e) => serializer.serialize_some(&e.to_string()),
		None => serializer.serialize_none(),
	}
}

impl TableReport {
	pub fn is_loaded(&self) -> bool {
		self.error.is_none()
	}
}

/// What a reload installed.
#[derive(Debug, Serialize)]
pub struct LoadReport {
	pub version: u64,
	pub read_acl: TableReport,
	pub write_acl: TableReport,
	pub privileges: TableReport,
}

impl LoadReport {
	pub fn is_complete(&self) -> bool {
		self.read_acl.is_loaded() && self.write_acl.is_loaded() && self.privileges.is_loaded()
	}

	pub fn errors(&self) -> impl Iterator<Item = &PolicyLoadError> {
		[&self.read_acl, &self.write_acl, &self.privileges]
			.into_iter()
			.filter_map(|t| t.error.as_ref())
	}
}

fn read(path: &Path) -> Result<String, PolicyLoadError> {
	std::fs::read_to_string(path).map_err(|source| PolicyLoadError::Io {
		path: path.to_path_buf(),
		source,
	})
}

/// Read and parse an ACL file.
pub fn load_acl_file(path: &Path) -> Result<AclTable, PolicyLoadError> {
	let content = read(path)?;
	parse_acl(&content).map_err(|source| PolicyLoadError::Acl {
		path: path.to_path_buf(),
		source,
	})
}

/// Read and parse a privilege file.
pub fn load_privileges_file(path: &Path) -> Result<PrivilegeTable, PolicyLoadError> {
	let content = read(path)?;
	parse_privileges(&content).map_err(|source| PolicyLoadError::Privileges {
		path: path.to_path_buf(),
		source,
	})
}

fn log_failure(table: &str, error: &PolicyLoadError) {
	match error {
		PolicyLoadError::Io { .. } => {
			error!(table, error = %error, "policy table unreadable, installing empty table")
		}
		_ => warn!(table, error = %error, "policy table malformed, installing empty table"),
	}
}

fn settle<T: Default>(
	table: &str,
	path: &Path,
	result: Result<T, PolicyLoadError>,
	len: impl Fn(&T) -> usize,
) -> (T, TableReport) {
	match result {
		Ok(value) => {
			let patterns = len(&value);
			(
				value,
				TableReport {
					path: path.to_path_buf(),
					patterns,
					error: None,
				},
			)
		}
		Err(error) => {
			log_failure(table, &error);
			(
				T::default(),
				TableReport {
					path: path.to_path_buf(),
					patterns: 0,
					error: Some(error),
				},
			)
		}
	}
}

/// Holds the active snapshot.
pub struct PolicyStore {
	current: RwLock<Arc<PolicySnapshot>>,
}

impl PolicyStore {
	/// A store in the unloaded state.
	pub fn new() -> Self {
		Self {
			current: RwLock::new(Arc::new(PolicySnapshot::unloaded())),
		}
	}

	/// The active snapshot. Holding it keeps that generation alive across
	/// later reloads.
	pub fn snapshot(&self) -> Arc<PolicySnapshot> {
		Arc::clone(&self.current.read())
	}

	pub fn version(&self) -> u64 {
		self.current.read().version
	}

	/// Parse all three files and swap in the resulting snapshot.
	pub fn reload(&self, sources: &PolicySources) -> LoadReport {
		let (read_acl, read_report) = settle(
			"read_acl",
			&sources.read_acl,
			load_acl_file(&sources.read_acl),
			AclTable::len,
		);
		let (write_acl, write_report) = settle(
			"write_acl",
			&sources.write_acl,
			load_acl_file(&sources.write_acl),
			AclTable::len,
		);
		let (privileges, privileges_report) = settle(
			"privileges",
			&sources.privileges,
			load_privileges_file(&sources.privileges),
			PrivilegeTable::len,
		);

		let version = self.install(read_acl, write_acl, privileges);

		LoadReport {
			version,
			read_acl: read_report,
			write_acl: write_report,
			privileges: privileges_report,
		}
	}

	/// Swap in already-built tables. Returns the new version.
	pub fn install(
		&self,
		read_acl: AclTable,
		write_acl: AclTable,
		privileges: PrivilegeTable,
	) -> u64 {
		let read_patterns = read_acl.len();
		let write_patterns = write_acl.len();
		let privilege_patterns = privileges.len();

		let mut current = self.current.write();
		let version = current.version + 1;
		*current = Arc::new(PolicySnapshot {
			version,
			read_acl,
			write_acl,
			privileges,
			loaded_at: Some(Utc::now()),
		});
		drop(current);

		info!(
			version,
			read_patterns, write_patterns, privilege_patterns, "policy snapshot installed"
		);
		version
	}
}

impl Default for PolicyStore {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	struct Fixture {
		_dir: tempfile::TempDir,
		sources: PolicySources,
	}

	fn fixture(read: Option<&str>, write: Option<&str>, privs: Option<&str>) -> Fixture {
		let dir = tempfile::tempdir().unwrap();
		let sources = PolicySources {
			read_acl: dir.path().join("Read.acl"),
			write_acl: dir.path().join("Write.acl"),
			privileges: dir.path().join("Privs.cfg"),
		};
		for (content, path) in [
			(read, &sources.read_acl),
			(write, &sources.write_acl),
			(privs, &sources.privileges),
		] {
			if let Some(content) = content {
				fs::write(path, content).unwrap();
			}
		}
		Fixture { _dir: dir, sources }
	}

	#[test]
	fn new_store_is_unloaded() {
		let store = PolicyStore::new();
		let snapshot = store.snapshot();
		assert_eq!(snapshot.version, 0);
		assert!(!snapshot.is_loaded());
		assert!(snapshot.read_acl.is_empty());
		assert!(snapshot.loaded_at.is_none());
	}

	#[test]
	fn reload_installs_all_tables() {
		let f = fixture(
			Some("/\n\topen\tALL\n"),
			Some("/players/*/*\n\topen\tAUTHOR\n/tmp\n\topen\tALL\n"),
			Some("/secure\tBIND\n"),
		);
		let store = PolicyStore::new();
		let report = store.reload(&f.sources);

		assert!(report.is_complete());
		assert_eq!(report.version, 1);
		assert_eq!(report.read_acl.patterns, 1);
		assert_eq!(report.write_acl.patterns, 2);
		assert_eq!(report.privileges.patterns, 1);
		assert!(store.snapshot().is_loaded());
	}

	#[test]
	fn malformed_table_is_installed_empty() {
		let f = fixture(
			Some("bogus\n"),
			Some("/tmp\n\topen\tALL\n"),
			Some("/secure\tBIND\n"),
		);
		let store = PolicyStore::new();
		let report = store.reload(&f.sources);

		assert!(!report.is_complete());
		assert!(matches!(
			report.read_acl.error,
			Some(PolicyLoadError::Acl { .. })
		));
		assert_eq!(report.errors().count(), 1);

		let snapshot = store.snapshot();
		assert!(snapshot.read_acl.is_empty());
		assert_eq!(snapshot.write_acl.len(), 1);
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let f = fixture(Some("/\n\topen\tALL\n"), None, Some(""));
		let report = PolicyStore::new().reload(&f.sources);
		assert!(matches!(
			report.write_acl.error,
			Some(PolicyLoadError::Io { .. })
		));
		assert!(report.privileges.is_loaded());
	}

	#[test]
	fn readers_keep_their_generation() {
		let f = fixture(Some("/\n\topen\tALL\n"), Some(""), Some(""));
		let store = PolicyStore::new();
		store.reload(&f.sources);
		let held = store.snapshot();

		fs::write(&f.sources.read_acl, "garbage\n").unwrap();
		let report = store.reload(&f.sources);

		assert_eq!(report.version, 2);
		assert_eq!(held.version, 1);
		assert_eq!(held.read_acl.len(), 1);
		assert!(store.snapshot().read_acl.is_empty());
	}

	#[test]
	fn versions_increase_per_reload() {
		let store = PolicyStore::new();
		for expected in 1..=3 {
			let version = store.install(AclTable::empty(), AclTable::empty(), PrivilegeTable::empty());
			assert_eq!(version, expected);
		}
		assert_eq!(store.version(), 3);
	}

	#[test]
	fn sources_from_config() {
		let config = PolicyConfig {
			mudlib_root: PathBuf::from("/srv/mud/lib"),
			..Default::default()
		};
		let sources = PolicySources::from_config(&config);
		assert_eq!(sources.read_acl, PathBuf::from("/srv/mud/lib/var/cfg/Read.acl"));
		assert_eq!(sources.privileges, PathBuf::from("/srv/mud/lib/var/cfg/Privs.cfg"));
	}
}
