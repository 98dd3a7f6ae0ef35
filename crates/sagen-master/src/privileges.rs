// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supplementary privileges for operations ACLs cannot express.
//!
//! The privilege file maps path patterns to privilege sets:
//!
//! ```text
//! /secure/daemons	BIND|DATABASE|SOCKET_SERVER|SOCKET_CLIENT
//! /Domains/Ex/obj/mirror	HIDE
//! /players/w/wiz	0x10
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{PrivilegeParseError, PrivilegeParseErrorKind};
use crate::matcher::{PathPattern, PathTable};

/// First bit index not yet assigned to a privilege. Assigned indices are
/// persisted in save files and must never be reused or renumbered.
pub const NEXT_FREE_PRIVILEGE: u32 = 7;

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
	pub struct Privileges: u32 {
		/// `bind()` a function pointer to another object.
		const BIND = 1 << 0;
		/// Database access beyond connect/close.
		const DATABASE = 1 << 1;
		/// Hide oneself and see hidden objects.
		const HIDE = 1 << 2;
		/// Compile `efun::` calls that bypass simul-efuns.
		const OVERRIDE = 1 << 3;
		/// Switch back to one's own uid while an euid is set.
		const SETEUID = 1 << 4;
		const SOCKET_SERVER = 1 << 5;
		const SOCKET_CLIENT = 1 << 6;
	}
}

impl Privileges {
	/// Decode the bitfield column of the privilege file.
	///
	/// Accepts names joined by `|` or `,`, a decimal or `0x` hexadecimal
	/// mask, or `-`/`none` for the empty set.
	pub fn decode(field: &str) -> Result<Self, PrivilegeParseErrorKind> {
		let field = field.trim();
		if field == "-" || field.eq_ignore_ascii_case("none") {
			return Ok(Self::empty());
		}

		if let Some(mask) = parse_mask(field) {
			return Self::from_bits(mask)
				.ok_or(PrivilegeParseErrorKind::UnassignedBits(mask as u64));
		}

		let mut privileges = Self::empty();
		for name in field.split(['|', ',']).map(str::trim) {
			if name.is_empty() {
				continue;
			}
			let flag = privilege_by_name(name)
				.ok_or_else(|| PrivilegeParseErrorKind::UnknownPrivilege(name.to_string()))?;
			privileges |= flag;
		}
		Ok(privileges)
	}
}

fn parse_mask(field: &str) -> Option<u32> {
	if let Some(hex) = field
		.strip_prefix("0x")
		.or_else(|| field.strip_prefix("0X"))
	{
		return u32::from_str_radix(hex, 16).ok();
	}
	if field.bytes().all(|b| b.is_ascii_digit()) {
		return field.parse().ok();
	}
	None
}

fn privilege_by_name(name: &str) -> Option<Privileges> {
	let upper = name.to_ascii_uppercase();
	match upper.as_str() {
		"DB" => Some(Privileges::DATABASE),
		"SOCK_SERV" => Some(Privileges::SOCKET_SERVER),
		"SOCK_CLNT" => Some(Privileges::SOCKET_CLIENT),
		other => Privileges::from_name(other),
	}
}

/// Path pattern -> privileges, most specific pattern wins.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeTable {
	entries: PathTable<Privileges>,
}

impl PrivilegeTable {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Privileges of the most specific pattern matching `segments`; empty if
	/// none matches.
	pub fn lookup(&self, segments: &[&str]) -> Privileges {
		self
			.entries
			.lookup(segments)
			.copied()
			.unwrap_or_else(Privileges::empty)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Parse the contents of a privilege file. A path listed twice gets the
/// union of its lines.
pub fn parse_privileges(content: &str) -> Result<PrivilegeTable, PrivilegeParseError> {
	let mut entries: PathTable<Privileges> = PathTable::new();

	for (idx, raw) in content.lines().enumerate() {
		let line_no = idx + 1;
		let err = |kind| PrivilegeParseError { line: line_no, kind };
		let line = raw.trim();

		if line.is_empty() || line.starts_with('#') {
			continue;
		}

		let (path, field) = line
			.split_once('\t')
			.ok_or_else(|| err(PrivilegeParseErrorKind::MissingSeparator))?;
		let pattern = PathPattern::parse(path.trim())
			.ok_or_else(|| err(PrivilegeParseErrorKind::InvalidPattern(path.to_string())))?;
		let privileges = Privileges::decode(field).map_err(err)?;

		*entries.entry_or_insert_with(&pattern, Privileges::empty) |= privileges;
	}

	Ok(PrivilegeTable { entries })
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod decode {
		use super::*;

		#[test]
		fn names() {
			assert_eq!(
				Privileges::decode("BIND|HIDE"),
				Ok(Privileges::BIND | Privileges::HIDE)
			);
			assert_eq!(
				Privileges::decode("sock_serv, sock_clnt"),
				Ok(Privileges::SOCKET_SERVER | Privileges::SOCKET_CLIENT)
			);
			assert_eq!(Privileges::decode("DB"), Ok(Privileges::DATABASE));
		}

		#[test]
		fn masks() {
			assert_eq!(Privileges::decode("1"), Ok(Privileges::BIND));
			assert_eq!(Privileges::decode("0x10"), Ok(Privileges::SETEUID));
			assert_eq!(Privileges::decode("127"), Ok(Privileges::all()));
		}

		#[test]
		fn empty_forms() {
			assert_eq!(Privileges::decode("-"), Ok(Privileges::empty()));
			assert_eq!(Privileges::decode("NONE"), Ok(Privileges::empty()));
		}

		#[test]
		fn rejects_unknown() {
			assert_eq!(
				Privileges::decode("FLY"),
				Err(PrivilegeParseErrorKind::UnknownPrivilege("FLY".to_string()))
			);
			assert_eq!(
				Privileges::decode("128"),
				Err(PrivilegeParseErrorKind::UnassignedBits(128))
			);
		}

		#[test]
		fn bit_indices_are_stable() {
			assert_eq!(Privileges::BIND.bits(), 1 << 0);
			assert_eq!(Privileges::DATABASE.bits(), 1 << 1);
			assert_eq!(Privileges::HIDE.bits(), 1 << 2);
			assert_eq!(Privileges::OVERRIDE.bits(), 1 << 3);
			assert_eq!(Privileges::SETEUID.bits(), 1 << 4);
			assert_eq!(Privileges::SOCKET_SERVER.bits(), 1 << 5);
			assert_eq!(Privileges::SOCKET_CLIENT.bits(), 1 << 6);
			assert_eq!(Privileges::all().bits(), (1 << NEXT_FREE_PRIVILEGE) - 1);
		}
	}

	mod table {
		use super::*;

		fn lookup(table: &PrivilegeTable, path: &str) -> Privileges {
			table.lookup(&crate::path::segments(path).unwrap())
		}

		#[test]
		fn most_specific_entry_wins() {
			let table =
				parse_privileges("# privileges\n/secure\tBIND|DATABASE\n/secure/daemons/net\tSOCKET_SERVER\n")
					.unwrap();
			assert_eq!(
				lookup(&table, "/secure/obj/master"),
				Privileges::BIND | Privileges::DATABASE
			);
			assert_eq!(
				lookup(&table, "/secure/daemons/net/inetd"),
				Privileges::SOCKET_SERVER
			);
			assert_eq!(lookup(&table, "/std/room"), Privileges::empty());
		}

		#[test]
		fn repeated_paths_union() {
			let table = parse_privileges("/std\tBIND\n/std\tHIDE\n").unwrap();
			assert_eq!(table.len(), 1);
			assert_eq!(lookup(&table, "/std/x"), Privileges::BIND | Privileges::HIDE);
		}

		#[test]
		fn malformed_lines() {
			let err = parse_privileges("/std BIND\n").unwrap_err();
			assert_eq!(err.kind, PrivilegeParseErrorKind::MissingSeparator);

			let err = parse_privileges("/std\tBIND\nstd\tHIDE\n").unwrap_err();
			assert_eq!(err.line, 2);
			assert!(matches!(err.kind, PrivilegeParseErrorKind::InvalidPattern(_)));

			let err = parse_privileges("/std\tFLY\n").unwrap_err();
			assert!(matches!(err.kind, PrivilegeParseErrorKind::UnknownPrivilege(_)));
		}
	}

	proptest! {
		#[test]
		fn assigned_masks_round_trip(mask in 0u32..(1 << NEXT_FREE_PRIVILEGE)) {
			let decoded = Privileges::decode(&mask.to_string()).unwrap();
			prop_assert_eq!(decoded.bits(), mask);
		}

		#[test]
		fn unassigned_bits_are_rejected(bit in NEXT_FREE_PRIVILEGE..32) {
			let field = format!("{:#x}", 1u32 << bit);
			prop_assert!(Privileges::decode(&field).is_err());
		}
	}
}
