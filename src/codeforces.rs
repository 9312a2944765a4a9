//! Codeforces upstream access.
//!
//! `UpstreamClient` walks the configured hosts (primary first, mirrors after)
//! once per logical call: one attempt per host, next host on any failure.
//! `Codeforces` layers the retry budgets on top of it for the per-tag fetch,
//! the full dump, and the user-status lookup.
//!
//! We log hosts, timings and record counts, never payloads.

use std::{sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info, instrument, warn};

use crate::config::UpstreamConfig;
use crate::domain::Problem;
use crate::error::{FetchError, UpstreamError};
use crate::retry::{retry, RetryPolicy};

pub const PROBLEMSET_METHOD: &str = "problemset.problems";
pub const USER_STATUS_METHOD: &str = "user.status";

#[derive(Clone)]
pub struct UpstreamClient {
  client: reqwest::Client,
  hosts: Arc<[String]>,
}

impl UpstreamClient {
  pub fn new(hosts: Vec<String>, user_agent: &str) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().user_agent(user_agent).build()?;
    let hosts: Vec<String> = hosts.into_iter().map(|h| h.trim_end_matches('/').to_string()).collect();
    Ok(Self { client, hosts: hosts.into() })
  }

  pub fn hosts(&self) -> &[String] { &self.hosts }

  /// Issue `GET {host}/api/{method}` against each host in order until one
  /// answers 2xx with an OK envelope. Each host is tried exactly once.
  pub async fn get<T: DeserializeOwned>(
    &self,
    method: &str,
    params: &[(&str, &str)],
    timeout: Duration,
  ) -> Result<T, UpstreamError> {
    let mut last = None;
    for host in self.hosts.iter() {
      let start = std::time::Instant::now();
      match self.get_from_host::<T>(host, method, params, timeout).await {
        Ok(v) => {
          debug!(target: "upstream", %host, %method, elapsed = ?start.elapsed(), "Upstream answered OK");
          return Ok(v);
        }
        Err(e) => {
          warn!(target: "upstream", %host, %method, elapsed = ?start.elapsed(), timeout = e.is_timeout(), error = %e, "Upstream host failed; trying next");
          last = Some(e);
        }
      }
    }
    match last {
      Some(e) => Err(UpstreamError::AllHostsFailed { hosts: self.hosts.len(), last: Box::new(e) }),
      None => Err(UpstreamError::NoHosts),
    }
  }

  async fn get_from_host<T: DeserializeOwned>(
    &self,
    host: &str,
    method: &str,
    params: &[(&str, &str)],
    timeout: Duration,
  ) -> Result<T, UpstreamError> {
    let url = format!("{}/api/{}", host, method);
    let mut req = self.client.get(&url).timeout(timeout);
    if !params.is_empty() {
      req = req.query(params);
    }

    let transport = |source: reqwest::Error| UpstreamError::Transport { host: host.to_string(), source };
    let res = req.send().await.map_err(transport)?;
    if !res.status().is_success() {
      return Err(UpstreamError::HttpStatus { host: host.to_string(), status: res.status().as_u16() });
    }
    let body = res.text().await.map_err(transport)?;
    decode_envelope(host, &body)
  }
}

/// `{"status": "OK" | "FAILED", "comment": ..., "result": ...}`
#[derive(Deserialize)]
struct Envelope<T> {
  status: String,
  #[serde(default)]
  comment: Option<String>,
  result: Option<T>,
}

fn decode_envelope<T: DeserializeOwned>(host: &str, body: &str) -> Result<T, UpstreamError> {
  let env: Envelope<T> = serde_json::from_str(body)
    .map_err(|source| UpstreamError::Decode { host: host.to_string(), source })?;
  if env.status != "OK" {
    return Err(UpstreamError::Status {
      host: host.to_string(),
      status: env.status,
      comment: env.comment.unwrap_or_default(),
    });
  }
  env.result.ok_or_else(|| UpstreamError::Decode {
    host: host.to_string(),
    source: <serde_json::Error as serde::de::Error>::missing_field("result"),
  })
}

// --- Upstream DTOs ---

#[derive(Debug, Deserialize)]
struct ProblemsetResult {
  #[serde(default)]
  problems: Vec<UpstreamProblem>,
}

/// Raw problem record. `contestId` is optional upstream; such records are skipped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamProblem {
  #[serde(default)]
  contest_id: Option<i64>,
  index: String,
  name: String,
  #[serde(default)]
  rating: Option<i64>,
  #[serde(default)]
  tags: Vec<String>,
}

fn into_problems(raw: Vec<UpstreamProblem>) -> Vec<Problem> {
  let total = raw.len();
  let out: Vec<Problem> = raw
    .into_iter()
    .filter_map(|p| {
      Some(Problem {
        contest_id: p.contest_id?,
        index: p.index,
        name: p.name,
        rating: p.rating,
        tags: p.tags,
      })
    })
    .collect();
  if out.len() < total {
    debug!(target: "upstream", skipped = total - out.len(), "Skipped records without contestId");
  }
  out
}

/// A submission as reported by `user.status`.
#[derive(Clone, Debug, Deserialize)]
pub struct Submission {
  pub id: i64,
  pub problem: SubmissionProblem,
  #[serde(default)]
  pub verdict: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionProblem {
  #[serde(default)]
  pub contest_id: Option<i64>,
  pub index: String,
}

/// First accepted (`OK`) submission for the given problem, if any.
pub fn find_accepted<'a>(subs: &'a [Submission], contest_id: i64, index: &str) -> Option<&'a Submission> {
  subs.iter().find(|s| {
    s.problem.contest_id == Some(contest_id)
      && s.problem.index == index
      && s.verdict.as_deref() == Some("OK")
  })
}

/// Retry budgets + timeouts over an `UpstreamClient`.
#[derive(Clone)]
pub struct Codeforces {
  pub client: UpstreamClient,
  pub cfg: UpstreamConfig,
}

impl Codeforces {
  pub fn from_config(cfg: &UpstreamConfig) -> Result<Self, reqwest::Error> {
    let client = UpstreamClient::new(cfg.hosts.clone(), &cfg.user_agent)?;
    Ok(Self { client, cfg: cfg.clone() })
  }

  fn live_policy(&self) -> RetryPolicy {
    RetryPolicy::new(self.cfg.live_attempts, self.cfg.retry_base_delay())
  }

  /// One walk over the hosts for the whole problemset, optionally by tag.
  async fn problemset_once(&self, tag: Option<&str>, timeout: Duration) -> Result<Vec<Problem>, UpstreamError> {
    let params: Vec<(&str, &str)> = tag.map(|t| vec![("tags", t)]).unwrap_or_default();
    let res: ProblemsetResult = self.client.get(PROBLEMSET_METHOD, &params, timeout).await?;
    Ok(into_problems(res.problems))
  }

  /// Per-tag live fetch (interactive budget). Upstream filters by tag;
  /// the answer is capped at `max_live_records`.
  #[instrument(level = "info", skip(self), fields(attempts = self.cfg.live_attempts))]
  pub async fn fetch_by_tag(&self, tag: &str) -> Result<Vec<Problem>, FetchError> {
    let timeout = self.cfg.timeout();
    let mut problems = retry(self.live_policy(), "fetch_by_tag", move |_| self.problemset_once(Some(tag), timeout)).await?;
    if problems.len() > self.cfg.max_live_records {
      warn!(target: "upstream", %tag, received = problems.len(), cap = self.cfg.max_live_records, "Per-tag answer truncated");
      problems.truncate(self.cfg.max_live_records);
    }
    info!(target: "upstream", %tag, count = problems.len(), "Live per-tag fetch succeeded");
    Ok(problems)
  }

  /// Full problemset with the given budget and per-attempt timeout.
  #[instrument(level = "info", skip(self, policy), fields(attempts = policy.attempts))]
  pub async fn fetch_all(&self, policy: RetryPolicy, timeout: Duration) -> Result<Vec<Problem>, FetchError> {
    let problems = retry(policy, "fetch_all", move |_| self.problemset_once(None, timeout)).await?;
    info!(target: "upstream", count = problems.len(), "Full problemset downloaded");
    Ok(problems)
  }

  /// Full dump with the dump budget (fewer attempts, longer timeout).
  pub async fn fetch_dump(&self) -> Result<Vec<Problem>, FetchError> {
    let policy = RetryPolicy::new(self.cfg.dump_attempts, self.cfg.retry_base_delay());
    self.fetch_all(policy, self.cfg.dump_timeout()).await
  }

  #[instrument(level = "info", skip(self))]
  pub async fn user_status(&self, handle: &str) -> Result<Vec<Submission>, FetchError> {
    let timeout = self.cfg.timeout();
    let params = [("handle", handle)];
    let params = &params[..];
    let subs: Vec<Submission> =
      retry(self.live_policy(), "user_status", move |_| self.client.get(USER_STATUS_METHOD, params, timeout)).await?;
    debug!(target: "upstream", %handle, count = subs.len(), "user.status fetched");
    Ok(subs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn envelope_ok_yields_result() {
    let body = r#"{"status":"OK","result":{"problems":[
      {"contestId":1,"index":"A","name":"Theatre Square","type":"PROGRAMMING","rating":1000,"tags":["math"]},
      {"index":"B","name":"No contest","tags":[]},
      {"contestId":2,"index":"C","name":"Unrated"}
    ],"problemStatistics":[]}}"#;
    let res: ProblemsetResult = decode_envelope("h", body).unwrap();
    let problems = into_problems(res.problems);
    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0].rating, Some(1000));
    assert_eq!(problems[1].rating, None);
    assert!(problems[1].tags.is_empty());
  }

  #[test]
  fn envelope_failed_is_status_error() {
    let body = r#"{"status":"FAILED","comment":"Call limit exceeded"}"#;
    let err = decode_envelope::<ProblemsetResult>("h", body).unwrap_err();
    match err {
      UpstreamError::Status { status, comment, .. } => {
        assert_eq!(status, "FAILED");
        assert_eq!(comment, "Call limit exceeded");
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn ok_without_result_and_garbage_are_decode_errors() {
    assert!(matches!(
      decode_envelope::<ProblemsetResult>("h", r#"{"status":"OK"}"#),
      Err(UpstreamError::Decode { .. })
    ));
    assert!(matches!(
      decode_envelope::<ProblemsetResult>("h", "<html>busy</html>"),
      Err(UpstreamError::Decode { .. })
    ));
  }

  #[test]
  fn find_accepted_requires_ok_verdict_and_exact_problem() {
    let subs: Vec<Submission> = serde_json::from_str(
      r#"[
        {"id":10,"problem":{"contestId":4,"index":"A"},"verdict":"WRONG_ANSWER"},
        {"id":11,"problem":{"contestId":4,"index":"B"},"verdict":"OK"},
        {"id":12,"problem":{"contestId":4,"index":"A"},"verdict":"OK"},
        {"id":13,"problem":{"contestId":4,"index":"A"}}
      ]"#,
    )
    .unwrap();
    assert_eq!(find_accepted(&subs, 4, "A").map(|s| s.id), Some(12));
    assert!(find_accepted(&subs, 5, "A").is_none());
  }
}
