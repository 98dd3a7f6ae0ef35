// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The player directory collaborator.

use std::collections::{HashMap, HashSet};

use crate::ids::GroupId;

/// Answers questions about player names that the monitor cannot derive from
/// paths alone.
pub trait Directory: Send + Sync {
	/// Whether `name` is an elevated (wizard-class) player.
	fn is_privileged_name(&self, name: &str) -> bool;

	/// Groups `name` is a verified member of.
	fn groups_of(&self, name: &str) -> Vec<GroupId>;
}

/// In-memory directory, populated up front.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
	privileged: HashSet<String>,
	groups: HashMap<String, Vec<GroupId>>,
}

impl StaticDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_privileged(mut self, name: impl Into<String>) -> Self {
		self.privileged.insert(name.into());
		self
	}

	pub fn with_member(mut self, name: impl Into<String>, group: impl Into<GroupId>) -> Self {
		let groups = self.groups.entry(name.into()).or_default();
		let group = group.into();
		if !groups.contains(&group) {
			groups.push(group);
		}
		self
	}
}

impl Directory for StaticDirectory {
	fn is_privileged_name(&self, name: &str) -> bool {
		self.privileged.contains(name)
	}

	fn groups_of(&self, name: &str) -> Vec<GroupId> {
		self.groups.get(name).cloned().unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn static_directory_answers() {
		let dir = StaticDirectory::new()
			.with_privileged("wiz")
			.with_member("bob", "__Wizards__")
			.with_member("bob", "__Wizards__")
			.with_member("bob", "Ex");

		assert!(dir.is_privileged_name("wiz"));
		assert!(!dir.is_privileged_name("bob"));
		assert_eq!(
			dir.groups_of("bob"),
			vec![GroupId::from("__Wizards__"), GroupId::from("Ex")]
		);
		assert!(dir.groups_of("nobody").is_empty());
	}
}
