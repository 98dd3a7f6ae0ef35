// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session roles consulted by the role-class ACL tokens.

use std::collections::{BTreeSet, HashMap};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, UserId};

bitflags! {
	/// Global roles of a live session.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
	pub struct Roles: u8 {
		const MORTAL = 1 << 0;
		const ELDER = 1 << 1;
		const WIZARD = 1 << 2;
		const ARCHWIZARD = 1 << 3;
		const ADMIN = 1 << 4;
	}
}

/// Everything the role tokens can ask about a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
	pub global: Roles,
	/// Domains the session is a wizard of.
	pub domain_wizard_of: BTreeSet<GroupId>,
	/// Domains the session is lord of.
	pub domain_lord_of: BTreeSet<GroupId>,
}

impl RoleSet {
	pub fn new(global: Roles) -> Self {
		Self {
			global,
			domain_wizard_of: BTreeSet::new(),
			domain_lord_of: BTreeSet::new(),
		}
	}

	pub fn mortal() -> Self {
		Self::new(Roles::MORTAL)
	}

	pub fn with_domain_wizard(mut self, domain: impl Into<GroupId>) -> Self {
		self.domain_wizard_of.insert(domain.into());
		self
	}

	pub fn with_domain_lord(mut self, domain: impl Into<GroupId>) -> Self {
		self.domain_lord_of.insert(domain.into());
		self
	}

	pub fn is_domain_wizard(&self, domain: &GroupId) -> bool {
		self.domain_wizard_of.contains(domain)
	}

	pub fn is_domain_lord(&self, domain: &GroupId) -> bool {
		self.domain_lord_of.contains(domain)
	}
}

impl Default for RoleSet {
	fn default() -> Self {
		Self::mortal()
	}
}

/// Supplies the roles of the session driven by `user`.
pub trait RoleSource: Send + Sync {
	fn role_of(&self, user: &UserId) -> RoleSet;
}

/// Fixed role assignments. Unlisted users are plain mortals.
#[derive(Debug, Clone, Default)]
pub struct StaticRoles {
	roles: HashMap<UserId, RoleSet>,
}

impl StaticRoles {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, user: impl Into<UserId>, roles: RoleSet) -> Self {
		self.roles.insert(user.into(), roles);
		self
	}
}

impl RoleSource for StaticRoles {
	fn role_of(&self, user: &UserId) -> RoleSet {
		self.roles.get(user).cloned().unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unlisted_users_are_mortal() {
		let roles = StaticRoles::new().with("wiz", RoleSet::new(Roles::MORTAL | Roles::WIZARD));
		assert_eq!(roles.role_of(&UserId::from("nobody")).global, Roles::MORTAL);
		assert!(roles
			.role_of(&UserId::from("wiz"))
			.global
			.contains(Roles::WIZARD));
	}

	#[test]
	fn domain_membership() {
		let set = RoleSet::mortal()
			.with_domain_wizard("Ex")
			.with_domain_lord("Ex");
		assert!(set.is_domain_wizard(&GroupId::from("Ex")));
		assert!(set.is_domain_lord(&GroupId::from("Ex")));
		assert!(!set.is_domain_lord(&GroupId::from("Other")));
	}
}
