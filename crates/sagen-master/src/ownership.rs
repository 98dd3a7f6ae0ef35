// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ownership derivation.
//!
//! Every path has exactly one owning credential, computed from directory
//! conventions alone:
//!
//! | tree | owner |
//! |---|---|
//! | `/secure/**` | `__root__:__Backbone__` |
//! | `/std/**` | `__backbone__:__Backbone__` |
//! | `/players`, `/players/<bucket>` | `__backbone__:__Backbone__` |
//! | `/players/<bucket>/<name>/**` | `<name>:__Wizards__` or `<name>:__Mortals__` |
//! | `/Domains` | `__backbone__:__Backbone__` |
//! | `/Domains/<D>/**` | `<D>:<D>` |
//! | `/Domains/<D>/members/<M>/**` | `<M>:<D>` |
//! | anything else | `__unknown__:__Unknown__` |
//!
//! The only collaborator consulted is [`Directory::is_privileged_name`], to
//! pick the group of a player tree.

use crate::directory::Directory;
use crate::ids::{Credential, GroupId, UserId};
use crate::path;

/// Marker the driver replaces with its configured include directories.
pub const DEFAULT_INCLUDE: &str = ":DEFAULT:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tree<'a> {
	Secure,
	Std,
	/// Directories above a player home or a domain.
	Backbone,
	Player {
		bucket: &'a str,
		name: &'a str,
		depth: usize,
	},
	Domain {
		domain: &'a str,
		depth: usize,
	},
	Member {
		domain: &'a str,
		member: &'a str,
		depth: usize,
	},
	Unknown,
}

fn classify(path: &str) -> Tree<'_> {
	let Some(segments) = path::segments(path) else {
		return Tree::Unknown;
	};

	match segments.as_slice() {
		["secure", ..] => Tree::Secure,
		["std", ..] => Tree::Std,
		["players"] | ["players", _] => Tree::Backbone,
		["players", bucket, name, rest @ ..] => Tree::Player {
			bucket: *bucket,
			name: *name,
			depth: rest.len(),
		},
		["Domains"] => Tree::Backbone,
		["Domains", domain, "members", member, rest @ ..] => Tree::Member {
			domain: *domain,
			member: *member,
			depth: rest.len(),
		},
		["Domains", domain, rest @ ..] => Tree::Domain {
			domain: *domain,
			depth: rest.len(),
		},
		_ => Tree::Unknown,
	}
}

fn player_group(name: &str, directory: &dyn Directory) -> GroupId {
	if directory.is_privileged_name(name) {
		GroupId::wizards()
	} else {
		GroupId::mortals()
	}
}

/// The owning user of `path`.
pub fn author_of(path: &str) -> UserId {
	match classify(path) {
		Tree::Secure => UserId::root(),
		Tree::Std | Tree::Backbone => UserId::backbone(),
		Tree::Player { name, .. } => UserId::from(name),
		Tree::Domain { domain, .. } => UserId::from(domain),
		Tree::Member { member, .. } => UserId::from(member),
		Tree::Unknown => UserId::unknown(),
	}
}

/// The owning group of `path`.
pub fn domain_of(path: &str, directory: &dyn Directory) -> GroupId {
	match classify(path) {
		Tree::Secure | Tree::Std | Tree::Backbone => GroupId::backbone(),
		Tree::Player { name, .. } => player_group(name, directory),
		Tree::Domain { domain, .. } | Tree::Member { domain, .. } => GroupId::from(domain),
		Tree::Unknown => GroupId::unknown(),
	}
}

/// `author_of` and `domain_of` as one credential.
pub fn owner_of(path: &str, directory: &dyn Directory) -> Credential {
	Credential {
		user: author_of(path),
		group: domain_of(path, directory),
	}
}

/// The credential stamped on an object created from `path`.
///
/// Unlike [`owner_of`], directory-level paths where no object may live
/// (a player's home, a bare domain) resolve to the unknown credential.
pub fn creator_of(path: &str, directory: &dyn Directory) -> Credential {
	match classify(path) {
		Tree::Secure => Credential::root(),
		Tree::Std => Credential::backbone(),
		Tree::Player { name, depth, .. } if depth > 0 => {
			Credential::new(name, player_group(name, directory))
		}
		Tree::Domain { domain, depth } if depth > 0 => Credential::new(domain, domain),
		Tree::Member { domain, member, .. } => Credential::new(member, domain),
		_ => Credential::unknown(),
	}
}

struct NoDirectory;

impl Directory for NoDirectory {
	fn is_privileged_name(&self, _name: &str) -> bool {
		false
	}

	fn groups_of(&self, _name: &str) -> Vec<GroupId> {
		Vec::new()
	}
}

/// Root user id reported to the driver at start-up.
pub fn root_uid() -> UserId {
	creator_of("/secure", &NoDirectory).user
}

/// Backbone user id reported to the driver at start-up.
pub fn backbone_uid() -> UserId {
	creator_of("/std", &NoDirectory).user
}

/// Include search path for a program compiled from `path`.
pub fn include_path(path: &str) -> Vec<String> {
	let mut dirs = vec![".".to_string()];
	match classify(path) {
		Tree::Secure => {
			dirs.push("/secure/include".to_string());
			return dirs;
		}
		Tree::Player { bucket, name, .. } => {
			dirs.push(format!("/players/{bucket}/{name}/include"));
		}
		Tree::Member {
			domain,
			member,
			depth,
		} if depth > 0 => {
			dirs.push(format!("/Domains/{domain}/members/{member}/include"));
			dirs.push(format!("/Domains/{domain}/include"));
		}
		Tree::Member { domain, .. } | Tree::Domain { domain, .. } => {
			dirs.push(format!("/Domains/{domain}/include"));
		}
		Tree::Std | Tree::Backbone | Tree::Unknown => {
			return vec![DEFAULT_INCLUDE.to_string()];
		}
	}
	dirs.push(DEFAULT_INCLUDE.to_string());
	dirs
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::directory::StaticDirectory;
	use crate::ids::{MORTALS_GID, WIZARDS_GID};
	use proptest::prelude::*;

	fn directory() -> StaticDirectory {
		StaticDirectory::new().with_privileged("wiz")
	}

	mod system_trees {
		use super::*;

		#[test]
		fn secure_is_root() {
			let owner = owner_of("/secure/obj/master.c", &directory());
			assert_eq!(owner, Credential::root());
			assert_eq!(owner_of("/secure", &directory()), Credential::root());
		}

		#[test]
		fn std_is_backbone() {
			assert_eq!(owner_of("/std/room.c", &directory()), Credential::backbone());
		}

		#[test]
		fn start_up_uids() {
			assert_eq!(root_uid(), UserId::root());
			assert_eq!(backbone_uid(), UserId::backbone());
		}
	}

	mod player_tree {
		use super::*;

		#[test]
		fn files_belong_to_the_player() {
			let dir = directory();
			assert_eq!(author_of("/players/w/wiz/workroom.c"), "wiz");
			assert_eq!(domain_of("/players/w/wiz/workroom.c", &dir), WIZARDS_GID);
			assert_eq!(domain_of("/players/b/bob/notes", &dir), MORTALS_GID);
		}

		#[test]
		fn home_directory_belongs_to_the_player() {
			assert_eq!(author_of("/players/w/wiz"), "wiz");
			assert_eq!(author_of("/players/w/wiz/"), "wiz");
		}

		#[test]
		fn intermediate_directories_belong_to_backbone() {
			assert_eq!(
				owner_of("/players/w", &directory()),
				Credential::backbone()
			);
			assert_eq!(owner_of("/players", &directory()), Credential::backbone());
		}
	}

	mod domain_tree {
		use super::*;

		#[test]
		fn files_belong_to_the_domain() {
			let dir = directory();
			assert_eq!(
				owner_of("/Domains/Ex/file.c", &dir),
				Credential::new("Ex", "Ex")
			);
			assert_eq!(owner_of("/Domains/Ex", &dir), Credential::new("Ex", "Ex"));
			assert_eq!(
				owner_of("/Domains/Ex/members", &dir),
				Credential::new("Ex", "Ex")
			);
		}

		#[test]
		fn member_trees_belong_to_the_member() {
			let dir = directory();
			assert_eq!(
				owner_of("/Domains/Ex/members/wiz1/x.c", &dir),
				Credential::new("wiz1", "Ex")
			);
			assert_eq!(
				owner_of("/Domains/Ex/members/wiz1", &dir),
				Credential::new("wiz1", "Ex")
			);
		}

		#[test]
		fn domains_root_is_backbone() {
			assert_eq!(owner_of("/Domains", &directory()), Credential::backbone());
		}
	}

	mod unknown {
		use super::*;

		#[test]
		fn outside_recognised_trees() {
			for p in ["/tmp/x.c", "/", "", "relative/path", "/open/board.c"] {
				assert_eq!(author_of(p), UserId::unknown(), "{p}");
				assert_eq!(domain_of(p, &directory()), GroupId::unknown(), "{p}");
			}
		}

		#[test]
		fn dotted_paths_are_unknown() {
			assert!(author_of("/players/w/wiz/../../../secure/x.c").is_unknown());
			assert!(author_of("/secure/./x.c").is_unknown());
		}
	}

	mod creator {
		use super::*;

		#[test]
		fn objects_in_owned_trees() {
			let dir = directory();
			assert_eq!(
				creator_of("/players/w/wiz/tool.c", &dir),
				Credential::new("wiz", WIZARDS_GID)
			);
			assert_eq!(
				creator_of("/Domains/Ex/obj/sword.c", &dir),
				Credential::new("Ex", "Ex")
			);
			assert_eq!(
				creator_of("/Domains/Ex/members/wiz1/x.c", &dir),
				Credential::new("wiz1", "Ex")
			);
			assert_eq!(creator_of("/std/room#3", &dir), Credential::backbone());
		}

		#[test]
		fn directory_level_paths_are_unknown() {
			let dir = directory();
			assert_eq!(creator_of("/players/w/wiz", &dir), Credential::unknown());
			assert_eq!(creator_of("/Domains/Ex", &dir), Credential::unknown());
			assert_eq!(creator_of("/tmp/x", &dir), Credential::unknown());
		}
	}

	mod include {
		use super::*;

		#[test]
		fn per_tree_include_paths() {
			assert_eq!(include_path("/secure/obj/master.c"), vec![".", "/secure/include"]);
			assert_eq!(
				include_path("/players/w/wiz/tool.c"),
				vec![".", "/players/w/wiz/include", DEFAULT_INCLUDE]
			);
			assert_eq!(
				include_path("/Domains/Ex/members/wiz1/x.c"),
				vec![
					".",
					"/Domains/Ex/members/wiz1/include",
					"/Domains/Ex/include",
					DEFAULT_INCLUDE
				]
			);
			assert_eq!(
				include_path("/Domains/Ex/room.c"),
				vec![".", "/Domains/Ex/include", DEFAULT_INCLUDE]
			);
			assert_eq!(include_path("/std/room.c"), vec![DEFAULT_INCLUDE]);
		}
	}

	proptest! {
		#[test]
		fn unrecognised_trees_are_unknown(top in "[a-z]{1,8}", rest in "(/[a-z]{1,6}){0,4}") {
			prop_assume!(!matches!(top.as_str(), "secure" | "std" | "players"));
			let p = format!("/{top}{rest}");
			prop_assert!(author_of(&p).is_unknown());
			prop_assert!(domain_of(&p, &directory()).is_unknown());
		}

		#[test]
		fn member_paths_are_owned_by_member(
			d in "[A-Z][a-z]{1,8}",
			m in "[a-z]{1,8}",
			x in "[a-z]{1,8}(\\.c)?",
		) {
			let p = format!("/Domains/{d}/members/{m}/{x}");
			prop_assert_eq!(author_of(&p), UserId::from(m.as_str()));
			prop_assert_eq!(domain_of(&p, &directory()), GroupId::from(d.as_str()));
		}
	}
}
