// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration.

use std::fmt;

use serde::Deserialize;

/// Placeholder printed instead of the password.
pub const REDACTED: &str = "[REDACTED]";

/// Database configuration (runtime, fully resolved).
///
/// The password is handed to the monitor when it opens a database
/// connection itself; it never appears in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub password: Option<String>,
}

impl fmt::Debug for DatabaseConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DatabaseConfig")
			.field("password", &self.password.as_ref().map(|_| REDACTED))
			.finish()
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub password: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.password.is_some() {
			self.password = other.password;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			password: self.password.filter(|p| !p.is_empty()),
		}
	}
}
