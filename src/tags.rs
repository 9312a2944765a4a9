//! Free-text topic → upstream canonical tag.
//!
//! Two separately testable steps: `normalize_words` and alias lookup.
//! Lookups are exact-match only; an unknown synonym passes through unchanged
//! and simply yields no upstream results.

use std::{collections::HashMap, sync::OnceLock};

/// User-friendly topic → official tag.
const TAG_ALIASES: &[(&str, &str)] = &[
  // data structures
  ("heap", "data structures"),
  ("heaps", "data structures"),
  ("priorityqueue", "data structures"),
  ("priority queue", "data structures"),
  // graphs
  ("bfs", "graphs"),
  ("dfs", "graphs"),
  ("graph", "graphs"),
  ("graphs", "graphs"),
  ("shortest path", "shortest paths"),
  ("shortest paths", "shortest paths"),
  // search / two pointers
  ("binarysearch", "binary search"),
  ("bs", "binary search"),
  ("two pointers", "two pointers"),
  ("twopointers", "two pointers"),
  // common topics
  ("dp", "dp"),
  ("math", "math"),
  ("greedy", "greedy"),
  ("implementation", "implementation"),
  ("strings", "strings"),
  ("string", "strings"),
  ("bitmask", "bitmasks"),
  ("bitmasks", "bitmasks"),
  ("combinatorics", "combinatorics"),
  ("geometry", "geometry"),
  // closest official tag to "recursion"
  ("recursion", "divide and conquer"),
];

fn alias_table() -> &'static HashMap<&'static str, &'static str> {
  static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
  TABLE.get_or_init(|| TAG_ALIASES.iter().copied().collect())
}

/// Lowercase, hyphens/underscores → spaces, collapse whitespace, trim.
pub fn normalize_words(input: &str) -> String {
  input
    .to_lowercase()
    .replace(['-', '_'], " ")
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Alias lookup on an already-normalized string: spaceless form first, then as-is.
pub fn lookup_alias(normalized: &str) -> Option<&'static str> {
  let table = alias_table();
  let no_spaces = normalized.replace(' ', "");
  table
    .get(no_spaces.as_str())
    .or_else(|| table.get(normalized))
    .copied()
}

/// Resolve a topic to the tag queried upstream. Empty input resolves to "".
pub fn resolve(input: &str) -> String {
  let raw = normalize_words(input);
  if raw.is_empty() {
    return raw;
  }
  match lookup_alias(&raw) {
    Some(tag) => tag.to_string(),
    None => raw,
  }
}
