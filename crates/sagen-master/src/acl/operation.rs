// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::borrow::Cow;

/// Operation key that applies when an entry has nothing for the requested one.
pub const CATCH_ALL: &str = "*";

/// Collapse an efun or command name into the category ACL files are
/// written in terms of.
pub fn normalize_operation(name: &str) -> Cow<'_, str> {
	let category = match name {
		"read_file" | "read_bytes" | "write_file" | "write_bytes" | "restore_object"
		| "save_object" | "ed_start" | "tail" | "cp" | "file" => "open",
		"get_dir" | "mkdir" | "rmdir" | "ls" => "opendir",
		"file_size" | "stat" => "stat",
		"rm" => "remove",
		"rename" | "mv" => "rename",
		"link" | "ln" => "ln",
		"load_object" | "clone_object" | "new" | "compile_object" | "include" => "load",
		_ if name.bytes().any(|b| b.is_ascii_uppercase()) => {
			return Cow::Owned(name.to_ascii_lowercase())
		}
		_ => return Cow::Borrowed(name),
	};
	Cow::Borrowed(category)
}
