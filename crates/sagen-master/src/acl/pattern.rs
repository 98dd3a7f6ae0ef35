// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wildcard class usable in place of a literal id in an ACL entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternClass {
	/// Anyone.
	All,
	/// The requester's user owns the path.
	Author,
	/// The requester's group owns the path.
	Domain,
	Mortal,
	Elder,
	Wizard,
	/// Wizard of the domain owning the path.
	DomainWizard,
	/// Lord of the domain owning the path.
	DomainLord,
	Archwizard,
	Admin,
}

impl PatternClass {
	/// Parse a class token. Both the plain spelling (`WIZARD`) and the
	/// historical one (`__Wizard__`) are accepted.
	pub fn from_token(token: &str) -> Option<Self> {
		let class = match token {
			"ALL" | "__ALL__" => PatternClass::All,
			"AUTHOR" | "__AUTHOR__" => PatternClass::Author,
			"DOMAIN" | "__DOMAIN__" => PatternClass::Domain,
			"MORTAL" | "__Player__" => PatternClass::Mortal,
			"ELDER" | "__Elder__" => PatternClass::Elder,
			"WIZARD" | "__Wizard__" => PatternClass::Wizard,
			"DOMAIN_WIZARD" | "__D_Wizard__" => PatternClass::DomainWizard,
			"DOMAIN_LORD" | "__D_Lord__" => PatternClass::DomainLord,
			"ARCHWIZARD" | "__Archwiz__" => PatternClass::Archwizard,
			"ADMIN" | "__ADMIN__" => PatternClass::Admin,
			_ => return None,
		};
		Some(class)
	}

	/// Whether the class is decided by the live session's roles.
	pub fn is_role(&self) -> bool {
		!matches!(
			self,
			PatternClass::All | PatternClass::Author | PatternClass::Domain
		)
	}

	/// Whether evaluating the class needs the owner of the target path.
	pub fn needs_owner(&self) -> bool {
		matches!(
			self,
			PatternClass::Author
				| PatternClass::Domain
				| PatternClass::DomainWizard
				| PatternClass::DomainLord
		)
	}
}

impl fmt::Display for PatternClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			PatternClass::All => "ALL",
			PatternClass::Author => "AUTHOR",
			PatternClass::Domain => "DOMAIN",
			PatternClass::Mortal => "MORTAL",
			PatternClass::Elder => "ELDER",
			PatternClass::Wizard => "WIZARD",
			PatternClass::DomainWizard => "DOMAIN_WIZARD",
			PatternClass::DomainLord => "DOMAIN_LORD",
			PatternClass::Archwizard => "ARCHWIZARD",
			PatternClass::Admin => "ADMIN",
		};
		f.write_str(s)
	}
}

/// One entry of an ACL credential list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialPattern {
	/// A user id or group id.
	Literal(String),
	Class(PatternClass),
}

impl CredentialPattern {
	pub fn parse(token: &str) -> Self {
		match PatternClass::from_token(token) {
			Some(class) => CredentialPattern::Class(class),
			None => CredentialPattern::Literal(token.to_string()),
		}
	}
}

impl fmt::Display for CredentialPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CredentialPattern::Literal(id) => f.write_str(id),
			CredentialPattern::Class(class) => class.fmt(f),
		}
	}
}
