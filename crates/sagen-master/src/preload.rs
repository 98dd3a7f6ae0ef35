// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Start-up helpers: the preload list and editor save names.

use std::collections::HashSet;

/// Suffix of the editor's emergency save file.
pub const SAVE_SUFFIX: &str = ".edsav";

/// Expand the contents of the preload file into program names.
///
/// `list_dir` returns the entries of a directory; it is only called for
/// lines ending in `/`, and only its `*.c` entries are used.
pub fn preload_list<F>(content: &str, mut list_dir: F) -> Vec<String>
where
	F: FnMut(&str) -> Vec<String>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();
	let mut push = |name: String| {
		if seen.insert(name.clone()) {
			out.push(name);
		}
	};

	for line in content.lines().map(str::trim) {
		if line.is_empty() || line.starts_with('#') {
			continue;
		}

		if line.ends_with('/') {
			let mut programs: Vec<String> = list_dir(line)
				.into_iter()
				.filter_map(|entry| entry.strip_suffix(".c").map(str::to_string))
				.filter(|stem| !stem.is_empty() && !stem.contains('/'))
				.collect();
			programs.sort();
			for stem in programs {
				push(format!("{line}{stem}"));
			}
		} else {
			push(line.strip_suffix(".c").unwrap_or(line).to_string());
		}
	}

	out
}

/// Where the editor saves `file` when its session dies.
pub fn save_file_name(file: &str) -> String {
	format!("{file}{SAVE_SUFFIX}")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn listing(dir: &str) -> Vec<String> {
		match dir {
			"/secure/daemons/" => vec![
				"net.c".to_string(),
				"mail.c".to_string(),
				"README".to_string(),
				"net.h".to_string(),
			],
			_ => Vec::new(),
		}
	}

	#[test]
	fn skips_comments_and_strips_extension() {
		let list = preload_list("# daemons\n\n/secure/obj/simul_efun.c\n  /std/room\n", listing);
		assert_eq!(list, vec!["/secure/obj/simul_efun", "/std/room"]);
	}

	#[test]
	fn expands_directories() {
		let list = preload_list("/secure/daemons/\n/empty/\n", listing);
		assert_eq!(list, vec!["/secure/daemons/mail", "/secure/daemons/net"]);
	}

	#[test]
	fn first_occurrence_wins() {
		let list = preload_list(
			"/secure/daemons/net.c\n/secure/daemons/\n/secure/daemons/net\n",
			listing,
		);
		assert_eq!(list, vec!["/secure/daemons/net", "/secure/daemons/mail"]);
	}

	#[test]
	fn only_directories_are_listed() {
		let mut calls = Vec::new();
		preload_list("/a/b\n/c/\n", |dir| {
			calls.push(dir.to_string());
			Vec::new()
		});
		assert_eq!(calls, vec!["/c/"]);
	}

	#[test]
	fn editor_save_name() {
		assert_eq!(save_file_name("/players/b/bob/notes"), "/players/b/bob/notes.edsav");
	}
}
