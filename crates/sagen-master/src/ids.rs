// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User and group identifiers and the `user:group` credential pair.
//!
//! The well-known ids below are stable strings. Objects persist them in save
//! files, so they are never renamed or reassigned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CredentialParseError;

pub const ROOT_UID: &str = "__root__";
pub const BACKBONE_UID: &str = "__backbone__";
pub const NOBODY_UID: &str = "__nobody__";
pub const UNKNOWN_UID: &str = "__unknown__";
pub const NEW_PLAYER_UID: &str = "__new_player__";

pub const BACKBONE_GID: &str = "__Backbone__";
pub const MORTALS_GID: &str = "__Mortals__";
pub const WIZARDS_GID: &str = "__Wizards__";
pub const NOBODY_GID: &str = "__Nodomain__";
pub const GUEST_GID: &str = "__Guest__";
pub const UNKNOWN_GID: &str = "__Unknown__";
pub const MAP_GID: &str = "__MAP__";
pub const NEWS_GID: &str = "__NEWS__";
pub const MAIL_GID: &str = "__MAIL__";
pub const CRON_GID: &str = "__CRON__";

macro_rules! define_id_type {
	($name:ident, $unknown:expr, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			pub fn unknown() -> Self {
				Self($unknown.to_string())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// The sentinel given to anything outside the recognised trees.
			pub fn is_unknown(&self) -> bool {
				self.0 == $unknown
			}

			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl PartialEq<str> for $name {
			fn eq(&self, other: &str) -> bool {
				self.0 == other
			}
		}

		impl PartialEq<&str> for $name {
			fn eq(&self, other: &&str) -> bool {
				self.0 == *other
			}
		}
	};
}

define_id_type!(UserId, UNKNOWN_UID, "A user id: a player, wizard, domain or system identity.");
define_id_type!(GroupId, UNKNOWN_GID, "A group id: a domain or one of the system groups.");

impl UserId {
	pub fn root() -> Self {
		Self::from(ROOT_UID)
	}

	pub fn backbone() -> Self {
		Self::from(BACKBONE_UID)
	}

	pub fn nobody() -> Self {
		Self::from(NOBODY_UID)
	}

	/// Per-connection guest identity, `__guest_<n>__`.
	pub fn guest(n: u32) -> Self {
		Self(format!("__guest_{n}__"))
	}

	pub fn is_root(&self) -> bool {
		self.0 == ROOT_UID
	}
}

impl GroupId {
	pub fn backbone() -> Self {
		Self::from(BACKBONE_GID)
	}

	pub fn nobody() -> Self {
		Self::from(NOBODY_GID)
	}

	pub fn mortals() -> Self {
		Self::from(MORTALS_GID)
	}

	pub fn wizards() -> Self {
		Self::from(WIZARDS_GID)
	}
}

/// A `(user, group)` pair, rendered as `user:group`.
///
/// A credential with an empty group is unresolved; it only ever matches ACL
/// entries on its user part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credential {
	pub user: UserId,
	pub group: GroupId,
}

impl Credential {
	pub fn new(user: impl Into<UserId>, group: impl Into<GroupId>) -> Self {
		Self {
			user: user.into(),
			group: group.into(),
		}
	}

	pub fn unresolved(user: impl Into<UserId>) -> Self {
		Self {
			user: user.into(),
			group: GroupId::new(""),
		}
	}

	pub fn unknown() -> Self {
		Self::new(UserId::unknown(), GroupId::unknown())
	}

	pub fn root() -> Self {
		Self::new(ROOT_UID, BACKBONE_GID)
	}

	pub fn backbone() -> Self {
		Self::new(BACKBONE_UID, BACKBONE_GID)
	}

	pub fn is_resolved(&self) -> bool {
		!self.group.is_empty()
	}

	pub fn is_unknown(&self) -> bool {
		self.user.is_unknown() || self.group.is_unknown()
	}
}

impl fmt::Display for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_resolved() {
			write!(f, "{}:{}", self.user, self.group)
		} else {
			write!(f, "{}", self.user)
		}
	}
}

impl FromStr for Credential {
	type Err = CredentialParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parts = s.split(':');
		let user = parts.next().unwrap_or_default();
		let group = parts.next().unwrap_or_default();
		if parts.next().is_some() {
			return Err(CredentialParseError::TooManySeparators(s.to_string()));
		}
		if user.is_empty() {
			return Err(CredentialParseError::EmptyUser);
		}
		Ok(Self::new(user, group))
	}
}
