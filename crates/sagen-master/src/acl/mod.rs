// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read and write access-control tables.
//!
//! An ACL file maps path patterns to operations, and operations to the
//! credential patterns allowed to perform them:
//!
//! ```text
//! # comment
//! /players
//! 	open	ALL
//! /players/*/*
//! 	*	AUTHOR ARCHWIZARD
//! /secure
//! 	open	__root__
//! ```

mod operation;
mod parser;
mod pattern;

pub use operation::{normalize_operation, CATCH_ALL};
pub use parser::parse_acl;
pub use pattern::{CredentialPattern, PatternClass};

use std::collections::HashMap;

use crate::matcher::PathTable;

/// Operation -> credential patterns for one path pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMap {
	operations: HashMap<String, Vec<CredentialPattern>>,
}

impl OperationMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append patterns to `operation`, keeping the first occurrence of each.
	pub fn extend(&mut self, operation: impl Into<String>, patterns: impl IntoIterator<Item = CredentialPattern>) {
		let list = self.operations.entry(operation.into()).or_default();
		for pattern in patterns {
			if !list.contains(&pattern) {
				list.push(pattern);
			}
		}
	}

	/// Patterns for an already normalised operation, falling back to the
	/// catch-all entry.
	pub fn get(&self, operation: &str) -> Option<&[CredentialPattern]> {
		self
			.operations
			.get(operation)
			.or_else(|| self.operations.get(CATCH_ALL))
			.map(Vec::as_slice)
	}

	pub fn len(&self) -> usize {
		self.operations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.operations.is_empty()
	}
}

/// A parsed ACL table. The empty table denies everything.
#[derive(Debug, Clone, Default)]
pub struct AclTable {
	entries: PathTable<OperationMap>,
}

impl AclTable {
	pub fn empty() -> Self {
		Self::default()
	}

	pub(crate) fn from_entries(entries: PathTable<OperationMap>) -> Self {
		Self { entries }
	}

	/// Entry of the most specific pattern matching `segments`.
	pub fn lookup(&self, segments: &[&str]) -> Option<&OperationMap> {
		self.entries.lookup(segments)
	}

	/// Number of path patterns.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
