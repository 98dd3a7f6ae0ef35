// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mudlib path handling.
//!
//! Every decision in the monitor is made on canonical absolute paths. A path
//! that still contains `.` or `..` segments is treated as unresolvable rather
//! than being normalised behind the caller's back.

/// Strip a clone suffix (`/obj/torch#42` -> `/obj/torch`).
pub fn strip_clone_suffix(name: &str) -> &str {
	match name.rfind('#') {
		Some(idx) if name[idx + 1..].bytes().all(|b| b.is_ascii_digit()) => &name[..idx],
		_ => name,
	}
}

/// Whether an object name carries a clone suffix.
pub fn is_clone(name: &str) -> bool {
	strip_clone_suffix(name).len() != name.len()
}

/// The program an object was compiled from: clone suffix and `.c` removed.
pub fn program_of(name: &str) -> &str {
	let name = strip_clone_suffix(name);
	name.strip_suffix(".c").unwrap_or(name)
}

/// Split an absolute path into its non-empty segments.
///
/// Returns `None` for relative or empty paths and for paths containing `.`
/// or `..` segments. The root path `/` yields no segments.
pub fn segments(path: &str) -> Option<Vec<&str>> {
	let rest = strip_clone_suffix(path).strip_prefix('/')?;
	let mut out = Vec::new();
	for segment in rest.split('/') {
		match segment {
			"" => continue,
			"." | ".." => return None,
			s => out.push(s),
		}
	}
	Some(out)
}

/// Last path segment, or the empty string for `/`.
pub fn basename(path: &str) -> &str {
	let path = strip_clone_suffix(path).trim_end_matches('/');
	match path.rfind('/') {
		Some(idx) => &path[idx + 1..],
		None => path,
	}
}

/// Whether `path` lies in or below the directory `dir`.
pub fn is_within(path: &str, dir: &str) -> bool {
	match (segments(path), segments(dir)) {
		(Some(path), Some(dir)) => path.len() >= dir.len() && path[..dir.len()] == dir[..],
		_ => false,
	}
}
