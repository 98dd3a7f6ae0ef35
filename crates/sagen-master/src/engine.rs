// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ACL evaluation.
//!
//! [`check_acl`] decides a read, write or link request against one policy
//! snapshot. Credential classes are tried in a fixed order regardless of
//! where they appear in the entry:
//!
//! 1. `ALL`
//! 2. literal user or group ids
//! 3. `AUTHOR` and `DOMAIN` against the owner of the path
//! 4. role classes, only for a live session
//!
//! Evaluation is pure. It reads the snapshot and its arguments and nothing
//! else, so nested calls (a link re-entering read and write) need no care.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::acl::{normalize_operation, CredentialPattern, PatternClass};
use crate::directory::Directory;
use crate::ids::Credential;
use crate::ownership::{author_of, domain_of};
use crate::path::segments;
use crate::policy::PolicySnapshot;
use crate::privileges::Privileges;
use crate::roles::{RoleSet, Roles};

/// Which ACL table a request is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
	Read,
	Write,
}

impl fmt::Display for AccessKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AccessKind::Read => f.write_str("read"),
			AccessKind::Write => f.write_str("write"),
		}
	}
}

/// A path together with the operation attempted on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTarget {
	pub path: String,
	/// Collaborator operation name; normalised before lookup.
	pub operation: String,
}

impl AccessTarget {
	pub fn new(path: impl Into<String>, operation: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			operation: operation.into(),
		}
	}
}

/// Operation used for both halves of a link request.
pub const LINK_OPERATION: &str = "ln";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequest {
	Read(AccessTarget),
	Write(AccessTarget),
	/// Read `from` and write `to`, both as `ln`.
	Link { from: String, to: String },
}

impl AccessRequest {
	pub fn read(path: impl Into<String>, operation: impl Into<String>) -> Self {
		AccessRequest::Read(AccessTarget::new(path, operation))
	}

	pub fn write(path: impl Into<String>, operation: impl Into<String>) -> Self {
		AccessRequest::Write(AccessTarget::new(path, operation))
	}

	pub fn link(from: impl Into<String>, to: impl Into<String>) -> Self {
		AccessRequest::Link {
			from: from.into(),
			to: to.into(),
		}
	}
}

/// Who is asking.
#[derive(Debug, Clone, Copy)]
pub struct Requester<'a> {
	pub credential: &'a Credential,
	/// Roles of the live session driving the request. `None` for anything
	/// that is not an interactive session, which disables role classes.
	pub roles: Option<&'a RoleSet>,
}

impl<'a> Requester<'a> {
	pub fn new(credential: &'a Credential) -> Self {
		Self {
			credential,
			roles: None,
		}
	}

	pub fn interactive(credential: &'a Credential, roles: &'a RoleSet) -> Self {
		Self {
			credential,
			roles: Some(roles),
		}
	}
}

/// The rule that allowed a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
	All,
	/// The requester's user or group was listed.
	Literal(String),
	Author,
	Domain,
	Role(PatternClass),
	/// The actor is the monitor object itself.
	Monitor,
	/// The actor runs with the root user id.
	RootIdentity,
	/// The actor is the trusted simul-efun object.
	TrustedSubsystem,
	Privilege(Privileges),
	/// seteuid back to the actor's own uid.
	OwnIdentity,
	/// seteuid into a group the session belongs to.
	GroupMembership,
	/// seteuid to the nobody identity.
	Downgrade,
	/// No object-creation or shadow rule objected.
	ObjectPolicy,
}

impl fmt::Display for Grant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Grant::All => f.write_str("ALL"),
			Grant::Literal(id) => write!(f, "literal {id}"),
			Grant::Author => f.write_str("AUTHOR"),
			Grant::Domain => f.write_str("DOMAIN"),
			Grant::Role(class) => write!(f, "role {class}"),
			Grant::Monitor => f.write_str("monitor"),
			Grant::RootIdentity => f.write_str("root identity"),
			Grant::TrustedSubsystem => f.write_str("trusted subsystem"),
			Grant::Privilege(p) => write!(f, "privilege {p:?}"),
			Grant::OwnIdentity => f.write_str("own identity"),
			Grant::GroupMembership => f.write_str("group membership"),
			Grant::Downgrade => f.write_str("downgrade"),
			Grant::ObjectPolicy => f.write_str("object policy"),
		}
	}
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
	/// Relative or empty path, a `.`/`..` segment, or an empty operation.
	MalformedRequest,
	/// No ACL pattern matches the path.
	NoMatchingEntry,
	/// The matching entry lists neither the operation nor `*`.
	NoOperationEntry,
	/// No listed credential pattern matched the requester.
	NoMatchingCredential,
	UnknownOwnership,
	/// A dot-prefixed path segment.
	HiddenPath,
	ScratchTree,
	/// A second instance of a single-instance system program.
	SingleInstance,
	/// A session-only object created outside a live session's namespace.
	RequiresSession,
	ShadowNaming,
	ShadowRoot,
	/// The target refused to be shadowed.
	ShadowRefused,
	MissingPrivilege(Privileges),
	/// The actor has no effective identity.
	MissingIdentity,
	/// Only the monitor may do this.
	MonitorOnly,
	UnknownSocketFunction(String),
	/// No seteuid rule applies.
	IdentityChange,
}

impl fmt::Display for DenyReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DenyReason::MalformedRequest => f.write_str("malformed request"),
			DenyReason::NoMatchingEntry => f.write_str("no matching acl entry"),
			DenyReason::NoOperationEntry => f.write_str("operation not listed"),
			DenyReason::NoMatchingCredential => f.write_str("no matching credential"),
			DenyReason::UnknownOwnership => f.write_str("unknown ownership"),
			DenyReason::HiddenPath => f.write_str("hidden path"),
			DenyReason::ScratchTree => f.write_str("scratch tree"),
			DenyReason::SingleInstance => f.write_str("single-instance program"),
			DenyReason::RequiresSession => f.write_str("requires a live session"),
			DenyReason::ShadowNaming => f.write_str("shadow naming"),
			DenyReason::ShadowRoot => f.write_str("target runs as root"),
			DenyReason::ShadowRefused => f.write_str("target refused shadow"),
			DenyReason::MissingPrivilege(p) => write!(f, "missing privilege {p:?}"),
			DenyReason::MissingIdentity => f.write_str("no effective identity"),
			DenyReason::MonitorOnly => f.write_str("monitor only"),
			DenyReason::UnknownSocketFunction(func) => write!(f, "unknown socket function {func}"),
			DenyReason::IdentityChange => f.write_str("identity change not permitted"),
		}
	}
}

/// Outcome of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	Allow(Grant),
	Deny(DenyReason),
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allow(_))
	}

	pub fn grant(&self) -> Option<&Grant> {
		match self {
			Decision::Allow(grant) => Some(grant),
			Decision::Deny(_) => None,
		}
	}

	pub fn deny_reason(&self) -> Option<&DenyReason> {
		match self {
			Decision::Allow(_) => None,
			Decision::Deny(reason) => Some(reason),
		}
	}
}

impl fmt::Display for Decision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Decision::Allow(grant) => write!(f, "allow ({grant})"),
			Decision::Deny(reason) => write!(f, "deny ({reason})"),
		}
	}
}

/// Decide `request` for `requester` against `snapshot`.
#[instrument(
	level = "debug",
	skip(snapshot, directory, requester),
	fields(
		requester = %requester.credential,
		interactive = requester.roles.is_some(),
		version = snapshot.version,
	)
)]
pub fn check_acl(
	snapshot: &PolicySnapshot,
	directory: &dyn Directory,
	requester: &Requester<'_>,
	request: &AccessRequest,
) -> Decision {
	let decision = match request {
		AccessRequest::Read(target) => check_target(snapshot, directory, requester, AccessKind::Read, target),
		AccessRequest::Write(target) => {
			check_target(snapshot, directory, requester, AccessKind::Write, target)
		}
		AccessRequest::Link { from, to } => {
			let read = AccessTarget::new(from.as_str(), LINK_OPERATION);
			match check_target(snapshot, directory, requester, AccessKind::Read, &read) {
				Decision::Allow(_) => {
					let write = AccessTarget::new(to.as_str(), LINK_OPERATION);
					check_target(snapshot, directory, requester, AccessKind::Write, &write)
				}
				deny => deny,
			}
		}
	};
	debug!(%decision, "acl decision");
	decision
}

fn check_target(
	snapshot: &PolicySnapshot,
	directory: &dyn Directory,
	requester: &Requester<'_>,
	kind: AccessKind,
	target: &AccessTarget,
) -> Decision {
	let operation = target.operation.trim();
	if operation.is_empty() {
		return Decision::Deny(DenyReason::MalformedRequest);
	}
	let Some(segs) = segments(&target.path) else {
		return Decision::Deny(DenyReason::MalformedRequest);
	};

	let Some(entry) = snapshot.acl(kind).lookup(&segs) else {
		return Decision::Deny(DenyReason::NoMatchingEntry);
	};
	let Some(patterns) = entry.get(&normalize_operation(operation)) else {
		return Decision::Deny(DenyReason::NoOperationEntry);
	};

	match match_patterns(patterns, directory, requester, &target.path) {
		Some(grant) => Decision::Allow(grant),
		None => Decision::Deny(DenyReason::NoMatchingCredential),
	}
}

fn has_class(patterns: &[CredentialPattern], class: PatternClass) -> bool {
	patterns.contains(&CredentialPattern::Class(class))
}

fn literal_matches(credential: &Credential, id: &str) -> bool {
	if !credential.user.is_unknown() && credential.user == id {
		return true;
	}
	credential.is_resolved() && !credential.group.is_unknown() && credential.group == id
}

fn match_patterns(
	patterns: &[CredentialPattern],
	directory: &dyn Directory,
	requester: &Requester<'_>,
	path: &str,
) -> Option<Grant> {
	let credential = requester.credential;

	if has_class(patterns, PatternClass::All) {
		return Some(Grant::All);
	}

	for pattern in patterns {
		if let CredentialPattern::Literal(id) = pattern {
			if literal_matches(credential, id) {
				return Some(Grant::Literal(id.clone()));
			}
		}
	}

	if !credential.user.is_unknown() && has_class(patterns, PatternClass::Author) {
		let author = author_of(path);
		if !author.is_unknown() && author == credential.user {
			return Some(Grant::Author);
		}
	}
	let resolved_group = credential.is_resolved() && !credential.group.is_unknown();
	if resolved_group && has_class(patterns, PatternClass::Domain) {
		let domain = domain_of(path, directory);
		if !domain.is_unknown() && domain == credential.group {
			return Some(Grant::Domain);
		}
	}

	let roles = requester.roles?;
	patterns.iter().find_map(|pattern| match pattern {
		CredentialPattern::Class(class) if class.is_role() => {
			role_matches(*class, roles, directory, path).then_some(Grant::Role(*class))
		}
		_ => None,
	})
}

fn role_matches(class: PatternClass, roles: &RoleSet, directory: &dyn Directory, path: &str) -> bool {
	match class {
		PatternClass::Mortal => true,
		PatternClass::Elder => roles.global.contains(Roles::ELDER),
		PatternClass::Wizard => roles.global.contains(Roles::WIZARD),
		PatternClass::Archwizard => roles.global.contains(Roles::ARCHWIZARD),
		PatternClass::Admin => roles.global.contains(Roles::ADMIN),
		PatternClass::DomainWizard => {
			let domain = domain_of(path, directory);
			!domain.is_unknown() && roles.is_domain_wizard(&domain)
		}
		PatternClass::DomainLord => {
			let domain = domain_of(path, directory);
			!domain.is_unknown() && roles.is_domain_lord(&domain)
		}
		PatternClass::All | PatternClass::Author | PatternClass::Domain => false,
	}
}
