// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::Credential;
use crate::path::program_of;

/// An object acting through a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
	/// Object name, `/path/file` or `/path/file#<clone>`.
	pub name: String,
	/// Base credential the object was created with.
	pub uid: Credential,
	/// Effective credential, if one is set.
	pub euid: Option<Credential>,
	/// Whether this is the live session driving the current request.
	#[serde(default)]
	pub interactive: bool,
}

impl ObjectRef {
	pub fn new(name: impl Into<String>, uid: Credential) -> Self {
		Self {
			name: name.into(),
			uid,
			euid: None,
			interactive: false,
		}
	}

	pub fn with_euid(mut self, euid: Credential) -> Self {
		self.euid = Some(euid);
		self
	}

	/// Mark as the live session. Its euid defaults to its uid.
	pub fn interactive(mut self) -> Self {
		self.interactive = true;
		if self.euid.is_none() {
			self.euid = Some(self.uid.clone());
		}
		self
	}

	pub fn program(&self) -> &str {
		program_of(&self.name)
	}

	/// Effective credential for display, `-` if unset.
	pub fn euid_display(&self) -> String {
		self
			.euid
			.as_ref()
			.map(ToString::to_string)
			.unwrap_or_else(|| "-".to_string())
	}
}

impl fmt::Display for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// A freshly loaded object awaiting `valid_object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCandidate {
	pub name: String,
	/// The program only makes sense bound to a live session.
	#[serde(default)]
	pub requires_session: bool,
}

impl ObjectCandidate {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			requires_session: false,
		}
	}

	pub fn requiring_session(mut self) -> Self {
		self.requires_session = true;
		self
	}
}

/// Lets a target object refuse to be shadowed.
pub trait ShadowHook: Send + Sync {
	fn prevents_shadow(&self, target: &ObjectRef, shadow: &ObjectRef) -> bool;
}

/// A hook under which no object refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitShadows;

impl ShadowHook for PermitShadows {
	fn prevents_shadow(&self, _target: &ObjectRef, _shadow: &ObjectRef) -> bool {
		false
	}
}
