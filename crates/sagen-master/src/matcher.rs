// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Most-specific path pattern lookup.
//!
//! Patterns are absolute paths whose segments are either literal or `*`
//! (exactly one segment). A pattern matches every path it is a segment-wise
//! prefix of. Among matching patterns the one with the most segments wins;
//! at equal depth a literal segment beats `*` at the first position where
//! the two differ. Declaration order never matters.

use std::collections::HashMap;
use std::fmt;

/// One segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSegment {
	Literal(String),
	Wildcard,
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
	segments: Vec<PatternSegment>,
}

impl PathPattern {
	/// Parse `/a/*/b`. Returns `None` for relative patterns, interior
	/// whitespace, and `.`/`..` segments.
	pub fn parse(pattern: &str) -> Option<Self> {
		let rest = pattern.strip_prefix('/')?;
		if pattern.chars().any(char::is_whitespace) {
			return None;
		}
		let mut segments = Vec::new();
		for segment in rest.split('/') {
			match segment {
				"" => continue,
				"." | ".." => return None,
				"*" => segments.push(PatternSegment::Wildcard),
				s => segments.push(PatternSegment::Literal(s.to_string())),
			}
		}
		Some(Self { segments })
	}

	pub fn depth(&self) -> usize {
		self.segments.len()
	}
}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.segments.is_empty() {
			return f.write_str("/");
		}
		for segment in &self.segments {
			match segment {
				PatternSegment::Literal(s) => write!(f, "/{s}")?,
				PatternSegment::Wildcard => f.write_str("/*")?,
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone)]
struct Node<T> {
	value: Option<T>,
	literal: HashMap<String, Node<T>>,
	wildcard: Option<Box<Node<T>>>,
}

impl<T> Default for Node<T> {
	fn default() -> Self {
		Self {
			value: None,
			literal: HashMap::new(),
			wildcard: None,
		}
	}
}

/// A segment trie from path patterns to values.
#[derive(Debug, Clone)]
pub struct PathTable<T> {
	root: Node<T>,
	len: usize,
}

impl<T> Default for PathTable<T> {
	fn default() -> Self {
		Self {
			root: Node::default(),
			len: 0,
		}
	}
}

impl<T> PathTable<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of distinct patterns.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// The value stored for `pattern`, inserting `default()` first if absent.
	pub fn entry_or_insert_with(
		&mut self,
		pattern: &PathPattern,
		default: impl FnOnce() -> T,
	) -> &mut T {
		let node = walk_mut(&mut self.root, pattern);
		if node.value.is_none() {
			self.len += 1;
		}
		node.value.get_or_insert_with(default)
	}

	/// Store `value` under `pattern`, replacing any previous value.
	pub fn insert(&mut self, pattern: &PathPattern, value: T) {
		if walk_mut(&mut self.root, pattern)
			.value
			.replace(value)
			.is_none()
		{
			self.len += 1;
		}
	}

	/// The value of the most specific pattern matching `segments`.
	pub fn lookup(&self, segments: &[&str]) -> Option<&T> {
		let mut best: Option<(usize, &T)> = None;
		find_best(&self.root, segments, 0, &mut best);
		best.map(|(_, value)| value)
	}
}

fn walk_mut<'t, T>(root: &'t mut Node<T>, pattern: &PathPattern) -> &'t mut Node<T> {
	let mut node = root;
	for segment in &pattern.segments {
		node = match segment {
			PatternSegment::Literal(s) => node.literal.entry(s.clone()).or_default(),
			PatternSegment::Wildcard => &mut **node.wildcard.get_or_insert_with(Box::default),
		};
	}
	node
}

// Depth-first, literal branch before wildcard branch: the first value found
// at a given depth is the one that prefers literals at the earliest position.
fn find_best<'t, T>(
	node: &'t Node<T>,
	segments: &[&str],
	depth: usize,
	best: &mut Option<(usize, &'t T)>,
) {
	if let Some(value) = &node.value {
		if best.map_or(true, |(d, _)| depth > d) {
			*best = Some((depth, value));
		}
	}

	let Some((head, tail)) = segments.split_first() else {
		return;
	};

	if let Some(child) = node.literal.get(*head) {
		find_best(child, tail, depth + 1, best);
	}
	if let Some(child) = &node.wildcard {
		find_best(child, tail, depth + 1, best);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn table(patterns: &[(&str, &'static str)]) -> PathTable<&'static str> {
		let mut table = PathTable::new();
		for (pattern, value) in patterns {
			table.insert(&PathPattern::parse(pattern).unwrap(), *value);
		}
		table
	}

	fn lookup<'t>(table: &'t PathTable<&'static str>, path: &str) -> Option<&'t &'static str> {
		table.lookup(&crate::path::segments(path).unwrap())
	}

	mod pattern {
		use super::*;

		#[test]
		fn parses_and_displays() {
			let p = PathPattern::parse("/players/*/wiz/").unwrap();
			assert_eq!(p.depth(), 3);
			assert_eq!(p.to_string(), "/players/*/wiz");
			assert_eq!(PathPattern::parse("/").unwrap().to_string(), "/");
		}

		#[test]
		fn rejects_bad_patterns() {
			assert!(PathPattern::parse("players").is_none());
			assert!(PathPattern::parse("/a b").is_none());
			assert!(PathPattern::parse("/a/../b").is_none());
		}
	}

	mod lookup {
		use super::*;

		#[test]
		fn most_specific_wins_regardless_of_order() {
			let t = table(&[("/players/w/wiz", "wiz"), ("/players", "players")]);
			assert_eq!(lookup(&t, "/players/w/wiz/file.c"), Some(&"wiz"));
			assert_eq!(lookup(&t, "/players/b/bob/file.c"), Some(&"players"));

			let reversed = table(&[("/players", "players"), ("/players/w/wiz", "wiz")]);
			assert_eq!(lookup(&reversed, "/players/w/wiz/file.c"), Some(&"wiz"));
		}

		#[test]
		fn no_match_is_none() {
			let t = table(&[("/players", "players")]);
			assert_eq!(lookup(&t, "/std/room.c"), None);
			assert_eq!(lookup(&t, "/"), None);
		}

		#[test]
		fn root_pattern_matches_everything() {
			let t = table(&[("/", "root"), ("/std", "std")]);
			assert_eq!(lookup(&t, "/tmp/x"), Some(&"root"));
			assert_eq!(lookup(&t, "/std/x"), Some(&"std"));
		}

		#[test]
		fn wildcard_matches_one_segment() {
			let t = table(&[("/players/*/*/open", "open")]);
			assert_eq!(lookup(&t, "/players/w/wiz/open/board.c"), Some(&"open"));
			assert_eq!(lookup(&t, "/players/w/open"), None);
		}

		#[test]
		fn deeper_wildcard_beats_shallower_literal() {
			let t = table(&[("/players/w", "literal"), ("/players/*/*", "wild")]);
			assert_eq!(lookup(&t, "/players/w/wiz/x"), Some(&"wild"));
		}

		#[test]
		fn literal_beats_wildcard_at_equal_depth() {
			let t = table(&[("/players/*/wiz", "wild"), ("/players/w/*", "literal-first")]);
			assert_eq!(lookup(&t, "/players/w/wiz/x"), Some(&"literal-first"));

			let t = table(&[("/players/*/wiz", "wild"), ("/players/w/wiz", "exact")]);
			assert_eq!(lookup(&t, "/players/w/wiz"), Some(&"exact"));
		}

		#[test]
		fn insert_replaces_and_counts_once() {
			let mut t = table(&[("/std", "a")]);
			t.insert(&PathPattern::parse("/std/").unwrap(), "b");
			assert_eq!(t.len(), 1);
			assert_eq!(lookup(&t, "/std/x"), Some(&"b"));
		}
	}

	proptest! {
		#[test]
		fn lookup_is_independent_of_insertion_order(
			patterns in proptest::collection::vec("(/(a|b|\\*)){0,3}", 1..8),
			path in "(/(a|b|c)){0,4}",
		) {
			let forward = {
				let mut t = PathTable::new();
				for p in &patterns {
					let parsed = PathPattern::parse(if p.is_empty() { "/" } else { p }).unwrap();
					t.insert(&parsed, parsed.to_string());
				}
				t
			};
			let backward = {
				let mut t = PathTable::new();
				for p in patterns.iter().rev() {
					let parsed = PathPattern::parse(if p.is_empty() { "/" } else { p }).unwrap();
					t.insert(&parsed, parsed.to_string());
				}
				t
			};
			let path = if path.is_empty() { "/".to_string() } else { path };
			let segments = crate::path::segments(&path).unwrap();
			prop_assert_eq!(forward.lookup(&segments), backward.lookup(&segments));
		}
	}
}
