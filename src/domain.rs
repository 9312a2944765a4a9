//! Domain models: problems, resolved queries, difficulty levels and serving tiers.

use serde::{Deserialize, Serialize};

/// A problem as obtained from the upstream. Never mutated after fetch;
/// the dump is replaced wholesale and the snapshot is read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub contest_id: i64,
  pub index: String,
  pub name: String,
  #[serde(default)]
  pub rating: Option<i64>,
  #[serde(default)]
  pub tags: Vec<String>,
}

impl Problem {
  /// Exact, case-insensitive membership of `tag_lower` in this record's own tags.
  pub fn has_tag(&self, tag_lower: &str) -> bool {
    self.tags.iter().any(|t| t.to_lowercase() == tag_lower)
  }

  pub fn key(&self) -> (i64, &str) { (self.contest_id, self.index.as_str()) }
}

/// The snapshot artifact stores exactly the `Problem` projection
/// (contestId, index, name, rating, tags).
pub type SnapshotRecord = Problem;

/// A query after tag resolution and parameter coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedQuery {
  /// Canonical upstream tag; empty means "no results".
  pub tag: String,
  pub min: i64,
  pub max: i64,
  pub limit: usize,
}

impl ResolvedQuery {
  /// `tag|min|max|limit`, no further normalization.
  pub fn cache_key(&self) -> String {
    format!("{}|{}|{}|{}", self.tag, self.min, self.max, self.limit)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
  Unrated,
  Beginner,
  Intermediate,
  Advanced,
}

impl Level {
  pub fn from_rating(rating: Option<i64>) -> Self {
    match rating {
      None => Level::Unrated,
      Some(r) if r < 1200 => Level::Beginner,
      Some(r) if r < 1600 => Level::Intermediate,
      Some(_) => Level::Advanced,
    }
  }
}

/// Which source ultimately produced a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  Live,
  Dump,
  Snapshot,
}

impl Tier {
  pub fn as_str(&self) -> &'static str {
    match self {
      Tier::Live => "live",
      Tier::Dump => "dump",
      Tier::Snapshot => "snapshot",
    }
  }
}

impl std::fmt::Display for Tier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn level_boundaries() {
    assert_eq!(Level::from_rating(None), Level::Unrated);
    assert_eq!(Level::from_rating(Some(800)), Level::Beginner);
    assert_eq!(Level::from_rating(Some(1199)), Level::Beginner);
    assert_eq!(Level::from_rating(Some(1200)), Level::Intermediate);
    assert_eq!(Level::from_rating(Some(1599)), Level::Intermediate);
    assert_eq!(Level::from_rating(Some(1600)), Level::Advanced);
  }

  #[test]
  fn cache_key_is_order_sensitive_concatenation() {
    let q = ResolvedQuery { tag: "data structures".into(), min: 800, max: 1200, limit: 2 };
    assert_eq!(q.cache_key(), "data structures|800|1200|2");
  }

  #[test]
  fn tag_membership_ignores_case_but_not_substrings() {
    let p = Problem {
      contest_id: 1,
      index: "A".into(),
      name: "x".into(),
      rating: None,
      tags: vec!["Data Structures".into()],
    };
    assert!(p.has_tag("data structures"));
    assert!(!p.has_tag("data"));
  }
}
