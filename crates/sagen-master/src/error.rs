// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for policy loading and identity parsing.
//!
//! Policy denials are not errors; they are [`crate::Decision`] values.

use std::path::PathBuf;

use thiserror::Error;

/// A `user:group` string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialParseError {
	#[error("credential has an empty user id")]
	EmptyUser,

	#[error("credential '{0}' has more than one ':' separator")]
	TooManySeparators(String),
}

/// A malformed line in an ACL file. One such line empties the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AclParseError {
	pub line: usize,
	pub kind: AclParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclParseErrorKind {
	#[error("section header '{0}' is not a valid path pattern")]
	InvalidSection(String),

	#[error("operation line appears before any section header")]
	OperationBeforeSection,

	#[error("operation '{0}' lists no credential patterns")]
	MissingCredentials(String),

	#[error("unexpected line '{0}'")]
	UnexpectedLine(String),
}

/// A malformed line in the privilege file. One such line empties the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct PrivilegeParseError {
	pub line: usize,
	pub kind: PrivilegeParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivilegeParseErrorKind {
	#[error("expected '<path>\\t<privileges>'")]
	MissingSeparator,

	#[error("'{0}' is not a valid path pattern")]
	InvalidPattern(String),

	#[error("unknown privilege '{0}'")]
	UnknownPrivilege(String),

	#[error("mask {0:#x} uses unassigned privilege bits")]
	UnassignedBits(u64),
}

/// Failure to load one policy table.
#[derive(Debug, Error)]
pub enum PolicyLoadError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed ACL file {path}: {source}")]
	Acl {
		path: PathBuf,
		#[source]
		source: AclParseError,
	},

	#[error("malformed privilege file {path}: {source}")]
	Privileges {
		path: PathBuf,
		#[source]
		source: PrivilegeParseError,
	},
}
