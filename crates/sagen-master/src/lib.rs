// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reference monitor for the sagen mudlib.
//!
//! Every file access, object creation, identity change and privileged efun
//! the driver performs is put to [`Master`] first. Decisions come from three
//! policy tables (read ACL, write ACL, privileges) held in an atomically
//! swapped [`PolicySnapshot`], and from ownership derived from mudlib paths.

pub mod acl;
pub mod directory;
pub mod engine;
pub mod error;
pub mod gates;
pub mod ids;
pub mod matcher;
pub mod ownership;
pub mod path;
pub mod policy;
pub mod preload;
pub mod privileges;
pub mod roles;

pub use acl::{normalize_operation, parse_acl, AclTable, CredentialPattern, OperationMap, PatternClass};
pub use directory::{Directory, StaticDirectory};
pub use engine::{
	check_acl, AccessKind, AccessRequest, AccessTarget, Decision, DenyReason, Grant, Requester,
};
pub use error::{
	AclParseError, AclParseErrorKind, CredentialParseError, PolicyLoadError, PrivilegeParseError,
	PrivilegeParseErrorKind,
};
pub use gates::{
	DatabaseDecision, Master, MasterBuilder, MasterSettings, ObjectCandidate, ObjectRef,
	PermitShadows, ShadowHook,
};
pub use ids::{Credential, GroupId, UserId};
pub use ownership::{author_of, creator_of, domain_of, include_path, owner_of};
pub use policy::{LoadReport, PolicySnapshot, PolicySources, PolicyStore, TableReport};
pub use preload::{preload_list, save_file_name};
pub use privileges::{parse_privileges, PrivilegeTable, Privileges};
pub use roles::{RoleSet, RoleSource, Roles, StaticRoles};
