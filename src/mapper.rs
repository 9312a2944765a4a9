//! Raw problems → output shape: rating filter, truncation, projection.
//!
//! Order-preserving; no sorting happens here, so output order is whatever the
//! upstream, dump or snapshot returned.

use crate::domain::{Level, Problem, ResolvedQuery};
use crate::protocol::{ExternalLink, ProblemOut, PLATFORM};

const PROBLEM_URL_BASE: &str = "https://codeforces.com/problemset/problem";

pub fn problem_url(contest_id: i64, index: &str) -> String {
  format!("{}/{}/{}", PROBLEM_URL_BASE, contest_id, index)
}

/// Unrated records always pass; rated ones need `min <= rating <= max`.
pub fn passes_rating(p: &Problem, min: i64, max: i64) -> bool {
  match p.rating {
    None => true,
    Some(r) => r >= min && r <= max,
  }
}

/// `topic` is the query's resolved tag, not the record's own tag list.
pub fn project(p: &Problem, topic: &str) -> ProblemOut {
  ProblemOut {
    id: format!("{}-{}", p.contest_id, p.index),
    title: p.name.clone(),
    rating: p.rating,
    topic: topic.to_string(),
    level: Level::from_rating(p.rating),
    external: ExternalLink {
      url: problem_url(p.contest_id, &p.index),
      platform: PLATFORM.to_string(),
      contest_id: p.contest_id,
      index: p.index.clone(),
    },
  }
}

pub fn map<'a, I>(raw: I, query: &ResolvedQuery) -> Vec<ProblemOut>
where
  I: IntoIterator<Item = &'a Problem>,
{
  raw
    .into_iter()
    .filter(|p| passes_rating(p, query.min, query.max))
    .take(query.limit)
    .map(|p| project(p, &query.tag))
    .collect()
}

/// Dump/snapshot tiers: exact, case-insensitive tag membership, then `map`.
pub fn map_tagged(raw: &[Problem], query: &ResolvedQuery) -> Vec<ProblemOut> {
  let tag_lower = query.tag.to_lowercase();
  map(raw.iter().filter(|p| p.has_tag(&tag_lower)), query)
}
