// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::acl::{normalize_operation, AclTable, CredentialPattern, OperationMap, CATCH_ALL};
use crate::error::{AclParseError, AclParseErrorKind};
use crate::matcher::{PathPattern, PathTable};

/// Parse the contents of an ACL file.
///
/// Any malformed line fails the whole parse; callers install an empty table
/// in that case. A section declared twice is merged, and an operation
/// repeated within a section appends to its credential list.
pub fn parse_acl(content: &str) -> Result<AclTable, AclParseError> {
	let mut entries: PathTable<OperationMap> = PathTable::new();
	let mut current: Option<PathPattern> = None;

	for (idx, raw) in content.lines().enumerate() {
		let line_no = idx + 1;
		let err = |kind| AclParseError { line: line_no, kind };
		let line = raw.trim_end();

		if line.trim_start().is_empty() || line.trim_start().starts_with('#') {
			continue;
		}

		if line.starts_with('/') {
			let pattern = PathPattern::parse(line)
				.ok_or_else(|| err(AclParseErrorKind::InvalidSection(line.to_string())))?;
			entries.entry_or_insert_with(&pattern, OperationMap::new);
			current = Some(pattern);
			continue;
		}

		if let Some(body) = line.strip_prefix('\t') {
			let Some(section) = current.as_ref() else {
				return Err(err(AclParseErrorKind::OperationBeforeSection));
			};
			let mut tokens = body.split_whitespace();
			let Some(operation) = tokens.next() else {
				continue;
			};
			let patterns: Vec<CredentialPattern> = tokens.map(CredentialPattern::parse).collect();
			if patterns.is_empty() {
				return Err(err(AclParseErrorKind::MissingCredentials(
					operation.to_string(),
				)));
			}
			let operation = if operation == CATCH_ALL {
				CATCH_ALL.to_string()
			} else {
				normalize_operation(operation).into_owned()
			};
			entries
				.entry_or_insert_with(section, OperationMap::new)
				.extend(operation, patterns);
			continue;
		}

		return Err(err(AclParseErrorKind::UnexpectedLine(line.to_string())));
	}

	Ok(AclTable::from_entries(entries))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::acl::PatternClass;

	fn ops<'t>(table: &'t AclTable, path: &str, op: &str) -> Option<&'t [CredentialPattern]> {
		table
			.lookup(&crate::path::segments(path).unwrap())
			.and_then(|entry| entry.get(op))
	}

	mod valid {
		use super::*;

		#[test]
		fn parses_sections_and_operations() {
			let table = parse_acl(
				"# read access\n\n/players\n\topen\tALL\n/players/w/wiz\n\topen wiz __Wizards__\n",
			)
			.unwrap();
			assert_eq!(table.len(), 2);
			assert_eq!(
				ops(&table, "/players/b/bob/x", "open"),
				Some(&[CredentialPattern::Class(PatternClass::All)][..])
			);
			assert_eq!(
				ops(&table, "/players/w/wiz/x", "open").map(<[_]>::len),
				Some(2)
			);
		}

		#[test]
		fn operation_names_are_normalised() {
			let table = parse_acl("/std\n\tread_file\tALL\n").unwrap();
			assert!(ops(&table, "/std/room.c", "open").is_some());
		}

		#[test]
		fn duplicate_sections_merge() {
			let table =
				parse_acl("/std\n\topen\tbob\n/secure\n\topen\t__root__\n/std\n\topen\talice\n\tstat\tALL\n")
					.unwrap();
			assert_eq!(table.len(), 2);
			assert_eq!(ops(&table, "/std/x", "open").map(<[_]>::len), Some(2));
			assert!(ops(&table, "/std/x", "stat").is_some());
		}

		#[test]
		fn section_without_operations_denies() {
			let table = parse_acl("/tmp\n").unwrap();
			assert_eq!(table.len(), 1);
			assert!(ops(&table, "/tmp/x", "open").is_none());
		}

		#[test]
		fn crlf_and_indented_comments() {
			let table = parse_acl("/std\r\n\t# nothing here\r\n\topen\tALL\r\n").unwrap();
			assert!(ops(&table, "/std/x", "open").is_some());
		}
	}

	mod malformed {
		use super::*;

		#[test]
		fn data_line_before_section() {
			let err = parse_acl("\topen\tALL\n/std\n").unwrap_err();
			assert_eq!(err.line, 1);
			assert_eq!(err.kind, AclParseErrorKind::OperationBeforeSection);
		}

		#[test]
		fn unexpected_first_line() {
			let err = parse_acl("players\n\topen\tALL\n").unwrap_err();
			assert_eq!(err.line, 1);
			assert!(matches!(err.kind, AclParseErrorKind::UnexpectedLine(_)));
		}

		#[test]
		fn space_indented_operation() {
			let err = parse_acl("/std\n    open ALL\n").unwrap_err();
			assert_eq!(err.line, 2);
		}

		#[test]
		fn operation_without_credentials() {
			let err = parse_acl("/std\n\topen\n").unwrap_err();
			assert_eq!(
				err.kind,
				AclParseErrorKind::MissingCredentials("open".to_string())
			);
		}

		#[test]
		fn section_with_whitespace() {
			let err = parse_acl("/std lib\n").unwrap_err();
			assert!(matches!(err.kind, AclParseErrorKind::InvalidSection(_)));
		}

		#[test]
		fn error_reports_line_number() {
			let err = parse_acl("# header\n/std\n\topen\tALL\n\nbogus\n").unwrap_err();
			assert_eq!(err.line, 5);
			assert_eq!(err.to_string(), "line 5: unexpected line 'bogus'");
		}
	}
}
