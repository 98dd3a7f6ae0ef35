// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::Deserialize;

use crate::sections::{
	AuditConfigLayer, DatabaseConfigLayer, LoggingConfigLayer, ObjectsConfigLayer,
	PolicyConfigLayer,
};

/// One source's view of the configuration; unset sections stay `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasterConfigLayer {
	#[serde(default)]
	pub policy: Option<PolicyConfigLayer>,
	#[serde(default)]
	pub objects: Option<ObjectsConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub audit: Option<AuditConfigLayer>,
}

macro_rules! merge_section {
	($self:ident, $other:ident, $field:ident) => {
		if let Some(overlay) = $other.$field {
			match $self.$field.as_mut() {
				Some(base) => base.merge(overlay),
				None => $self.$field = Some(overlay),
			}
		}
	};
}

impl MasterConfigLayer {
	/// Overlay `other` on top of `self`; fields set in `other` win.
	pub fn merge(&mut self, other: MasterConfigLayer) {
		merge_section!(self, other, policy);
		merge_section!(self, other, objects);
		merge_section!(self, other, database);
		merge_section!(self, other, logging);
		merge_section!(self, other, audit);
	}
}
