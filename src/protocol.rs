//! Public HTTP protocol structs (serde ready).
//! Field names follow what the learning app already consumes (`_id`, `contestId`, ...).

use serde::{Deserialize, Serialize};

use crate::config::QueryDefaults;
use crate::domain::Level;

/// Response header carrying the serving tier (`live` | `dump` | `snapshot`).
pub const SOURCE_HEADER: &str = "x-cf-source";
/// Response header carrying the resolved tag queried upstream.
pub const TAG_HEADER: &str = "x-cf-tag";

pub const PLATFORM: &str = "codeforces";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemOut {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub rating: Option<i64>,
    pub topic: String,
    pub level: Level,
    pub external: ExternalLink,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub url: String,
    pub platform: String,
    pub contest_id: i64,
    pub index: String,
}

//
// HTTP request/response DTOs
//

/// Query string as decoded `(key, value)` pairs, repeats included.
pub type QueryPairs = Vec<(String, String)>;

/// First value for `key`; later repeats are ignored.
fn first(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

/// Raw query parameters. Kept as strings so non-numeric values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ProblemsQuery {
    pub tag: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub limit: Option<String>,
}

/// Coerced numeric parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
    pub limit: usize,
}

impl ProblemsQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            tag: first(pairs, "tag"),
            min: first(pairs, "min"),
            max: first(pairs, "max"),
            limit: first(pairs, "limit"),
        }
    }

    pub fn bounds(&self, defaults: &QueryDefaults) -> Bounds {
        fn num<T: std::str::FromStr>(v: &Option<String>) -> Option<T> {
            v.as_deref().and_then(|s| s.trim().parse::<T>().ok())
        }
        Bounds {
            min: num(&self.min).unwrap_or(defaults.min_rating),
            max: num(&self.max).unwrap_or(defaults.max_rating),
            // a zero limit is as meaningless as a missing one
            limit: num::<usize>(&self.limit).filter(|l| *l > 0).unwrap_or(defaults.limit),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AcceptedQuery {
    pub handle: Option<String>,
    #[serde(rename = "contestId")]
    pub contest_id: Option<String>,
    pub index: Option<String>,
}

/// A validated accepted-submission lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedTarget {
    pub handle: String,
    pub contest_id: i64,
    pub index: String,
}

impl AcceptedQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            handle: first(pairs, "handle"),
            contest_id: first(pairs, "contestId"),
            index: first(pairs, "index"),
        }
    }

    /// Trimmed, non-empty handle and index plus a numeric contest id,
    /// or the message to send back.
    pub fn target(&self) -> Result<AcceptedTarget, &'static str> {
        let text = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let handle = text(&self.handle).ok_or("Codeforces handle required")?;
        let contest_id = self
            .contest_id
            .as_deref()
            .and_then(|c| c.trim().parse::<i64>().ok())
            .ok_or("Numeric contestId required")?;
        let index = text(&self.index).ok_or("Problem index required")?;
        Ok(AcceptedTarget { handle, contest_id, index })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedOut {
    pub solved: bool,
    pub submission_id: Option<i64>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}
