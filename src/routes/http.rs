//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::{HeaderValue, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{debug, error, instrument};

use crate::logic::{check_accepted, serve_problems};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// Always 200. Tier and resolved tag go out as headers, except for cache hits.
/// Repeated keys are tolerated (first value wins).
#[instrument(level = "info", skip(state, pairs), fields(params = pairs.len()))]
pub async fn http_get_problems(
  State(state): State<Arc<AppState>>,
  Query(pairs): Query<QueryPairs>,
) -> Response {
  let q = ProblemsQuery::from_pairs(&pairs);
  let bounds = q.bounds(&state.cfg.query);
  let raw_tag = q.tag.as_deref().unwrap_or_default();
  let served = serve_problems(&state, raw_tag, bounds).await;

  let mut res = Json(served.problems.as_slice()).into_response();
  if let Some(tier) = served.tier {
    let headers = res.headers_mut();
    headers.insert(SOURCE_HEADER, HeaderValue::from_static(tier.as_str()));
    headers.insert(TAG_HEADER, tag_header(&served.tag));
  }
  res
}

/// The tag verbatim when it is a valid header value, percent-encoded otherwise.
fn tag_header(tag: &str) -> HeaderValue {
  HeaderValue::from_str(tag).unwrap_or_else(|_| {
    debug!(target: "problems", %tag, "Tag percent-encoded for header");
    HeaderValue::from_str(&urlencoding::encode(tag)).unwrap_or_else(|_| HeaderValue::from_static(""))
  })
}

#[instrument(level = "info", skip(state, pairs), fields(params = pairs.len()))]
pub async fn http_get_accepted(
  State(state): State<Arc<AppState>>,
  Query(pairs): Query<QueryPairs>,
) -> Response {
  let target = match AcceptedQuery::from_pairs(&pairs).target() {
    Ok(t) => t,
    Err(msg) => return (StatusCode::BAD_REQUEST, Json(ErrorOut { error: msg.into() })).into_response(),
  };
  match check_accepted(&state, &target.handle, target.contest_id, &target.index).await {
    Ok(out) => Json(out).into_response(),
    Err(e) => {
      error!(target: "problems", handle = %target.handle, error = %e, "Accepted lookup failed");
      (StatusCode::BAD_GATEWAY, Json(ErrorOut { error: "Codeforces unavailable".into() })).into_response()
    }
  }
}

pub async fn http_not_found() -> impl IntoResponse {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: "Not found".into() }))
}
