// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sagen_master::{
	Credential, GroupId, Master, MasterSettings, ObjectRef, RoleSet, Roles, StaticDirectory,
	StaticRoles,
};
use sagen_master_audit::{AuditService, AuditSeverity, AuditSink, MemoryAuditSink};
use sagen_master_config::MasterConfig;

pub const READ_ACL: &str = "\
# who may read what
/
\t*\tALL
/secure
\t*\t__root__
\tstat\tALL
/players/*/*/private
\t*\tAUTHOR ARCHWIZARD
";

pub const WRITE_ACL: &str = "\
# who may write what
/players/*/*
\t*\tAUTHOR
/Domains/Ex
\twrite\tAUTHOR
\topen\tAUTHOR
/tmp
\t*\tALL
/doc
\topen\tWIZARD
";

pub const PRIVILEGES: &str = "\
/secure/daemons\tBIND|DATABASE
/secure/daemons/inetd\tSOCKET_SERVER|SOCKET_CLIENT
/players/w/wiz1/cloak\tHIDE
";

pub struct Mud {
	pub master: Master,
	pub audit: Arc<MemoryAuditSink>,
	pub root: tempfile::TempDir,
}

impl Mud {
	pub fn new() -> Self {
		Self::with_tables(READ_ACL, WRITE_ACL, PRIVILEGES)
	}

	pub fn with_tables(read: &str, write: &str, privileges: &str) -> Self {
		let root = tempfile::tempdir().unwrap();
		let mut config = MasterConfig::default();
		config.policy.mudlib_root = root.path().to_path_buf();

		let mud = Self::build(root, &config);
		mud.write_tables(read, write, privileges);
		let report = mud.master.reload_policy();
		assert!(report.is_complete(), "{report:?}");
		mud.audit.clear();
		mud
	}

	fn build(root: tempfile::TempDir, config: &MasterConfig) -> Self {
		let audit = Arc::new(MemoryAuditSink::new());
		let master = Master::builder(MasterSettings::from_config(config))
			.directory(Arc::new(
				StaticDirectory::new()
					.with_privileged("wiz1")
					.with_member("bob", GroupId::wizards()),
			))
			.roles(Arc::new(
				StaticRoles::new()
					.with("wiz1", RoleSet::new(Roles::MORTAL | Roles::WIZARD))
					.with("arch", RoleSet::new(Roles::MORTAL | Roles::WIZARD | Roles::ARCHWIZARD)),
			))
			.audit(AuditService::new(
				AuditSeverity::Debug,
				vec![audit.clone() as Arc<dyn AuditSink>],
			))
			.build();
		Self { master, audit, root }
	}

	pub fn cfg_dir(&self) -> PathBuf {
		self.root.path().join("var/cfg")
	}

	pub fn write_tables(&self, read: &str, write: &str, privileges: &str) {
		let dir = self.cfg_dir();
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join("Read.acl"), read).unwrap();
		fs::write(dir.join("Write.acl"), write).unwrap();
		fs::write(dir.join("Privs.cfg"), privileges).unwrap();
	}
}

/// A non-interactive object running with `credential` as both uid and euid.
pub fn object(name: &str, credential: &str) -> ObjectRef {
	let credential: Credential = credential.parse().unwrap();
	ObjectRef::new(name, credential.clone()).with_euid(credential)
}

/// The live session of `user`.
pub fn session(user: &str, group: &str) -> ObjectRef {
	ObjectRef::new("/secure/obj/player/player#1", Credential::new(user, group)).interactive()
}
