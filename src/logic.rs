//! Core behaviors behind the HTTP handlers.
//!
//! Problem queries go through the result cache and, on a miss, the one-way
//! tier machine `Live -> Dump -> Snapshot`. Each tier runs at most once and
//! the snapshot tier cannot fail, so a query always produces an answer;
//! degradation is visible only through the reported tier.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::codeforces::find_accepted;
use crate::domain::{ResolvedQuery, Tier};
use crate::error::FetchError;
use crate::mapper;
use crate::protocol::{AcceptedOut, Bounds, ProblemOut};
use crate::state::AppState;
use crate::tags;

/// Outcome of a problem query.
#[derive(Clone, Debug)]
pub struct Served {
  pub problems: Arc<Vec<ProblemOut>>,
  /// Resolved tag; empty when the input resolved to nothing.
  pub tag: String,
  /// `None` for cache hits and empty-tag short-circuits.
  pub tier: Option<Tier>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
  TryLive,
  TryDump,
  TrySnapshot,
}

#[instrument(level = "info", skip(state), fields(min = bounds.min, max = bounds.max, limit = bounds.limit))]
pub async fn serve_problems(state: &AppState, raw_tag: &str, bounds: Bounds) -> Served {
  let tag = tags::resolve(raw_tag);
  if tag.is_empty() {
    debug!(target: "problems", %raw_tag, "Empty tag; nothing to serve");
    return Served { problems: Arc::new(Vec::new()), tag, tier: None };
  }

  let query = ResolvedQuery { tag, min: bounds.min, max: bounds.max, limit: bounds.limit };
  info!(target: "problems", %raw_tag, tag = %query.tag, min = query.min, max = query.max, limit = query.limit, "Tag request");

  let key = query.cache_key();
  if let Some(hit) = state.results.get(&key).await {
    debug!(target: "problems", %key, count = hit.len(), "Result cache hit");
    return Served { problems: hit, tag: query.tag, tier: None };
  }

  let (out, tier) = fetch_tiered(state, &query).await;
  let problems = Arc::new(out);
  state.results.set(key, problems.clone()).await;
  info!(target: "problems", tag = %query.tag, %tier, count = problems.len(), "Problems served");
  Served { problems, tag: query.tag, tier: Some(tier) }
}

/// Run the tier machine for a cache miss.
pub async fn fetch_tiered(state: &AppState, query: &ResolvedQuery) -> (Vec<ProblemOut>, Tier) {
  let mut stage = Stage::TryLive;
  loop {
    match stage {
      Stage::TryLive => match state.cf.fetch_by_tag(&query.tag).await {
        Ok(list) => return (mapper::map(&list, query), Tier::Live),
        Err(e) => {
          warn!(target: "problems", tag = %query.tag, error = %e, "Live per-tag fetch failed");
          stage = Stage::TryDump;
        }
      },
      Stage::TryDump => match state.dump.get_or_fetch(|| state.cf.fetch_dump()).await {
        Ok(dump) => return (mapper::map_tagged(&dump, query), Tier::Dump),
        Err(e) => {
          warn!(target: "problems", tag = %query.tag, error = %e, "Dump fetch failed");
          stage = Stage::TrySnapshot;
        }
      },
      Stage::TrySnapshot => {
        let out = mapper::map_tagged(state.snapshot.records(), query);
        if state.snapshot.is_empty() {
          warn!(target: "problems", tag = %query.tag, "Snapshot tier reached with empty snapshot");
        }
        return (out, Tier::Snapshot);
      }
    }
  }
}

/// Whether `handle` has an accepted submission for `contest_id`/`index`.
#[instrument(level = "info", skip(state))]
pub async fn check_accepted(
  state: &AppState,
  handle: &str,
  contest_id: i64,
  index: &str,
) -> Result<AcceptedOut, FetchError> {
  let subs = state.cf.user_status(handle).await?;
  let hit = find_accepted(&subs, contest_id, index);
  info!(target: "problems", %handle, contest_id, %index, solved = hit.is_some(), "Accepted lookup");
  Ok(AcceptedOut { solved: hit.is_some(), submission_id: hit.map(|s| s.id) })
}
