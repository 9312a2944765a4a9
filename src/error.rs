//! Error taxonomy for upstream access, configuration and snapshot handling.
//!
//! An empty result (unknown tag, nothing in range) is never an error; it is a
//! well-formed zero-length answer and travels as `Ok(vec![])`.

use thiserror::Error;

/// One failed attempt against the upstream, or the whole host list.
#[derive(Debug, Error)]
pub enum UpstreamError {
  /// Host unreachable, connection reset, or per-attempt timeout.
  #[error("transport error from {host}: {source}")]
  Transport {
    host: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{host} answered HTTP {status}")]
  HttpStatus { host: String, status: u16 },

  /// Host reachable but the payload carries a non-OK status.
  #[error("{host} reported status {status}: {comment}")]
  Status { host: String, status: String, comment: String },

  #[error("undecodable payload from {host}: {source}")]
  Decode {
    host: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("no upstream hosts configured")]
  NoHosts,

  #[error("all {hosts} upstream hosts failed, last: {last}")]
  AllHostsFailed {
    hosts: usize,
    #[source]
    last: Box<UpstreamError>,
  },
}

impl UpstreamError {
  pub fn is_timeout(&self) -> bool {
    match self {
      UpstreamError::Transport { source, .. } => source.is_timeout(),
      UpstreamError::AllHostsFailed { last, .. } => last.is_timeout(),
      _ => false,
    }
  }
}

/// Raised once a retry budget is spent. Triggers tier fallback in the orchestrator.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("exhausted {attempts} attempts: {last}")]
  ExhaustedRetries {
    attempts: u32,
    #[source]
    last: UpstreamError,
  },
}

impl From<crate::retry::Exhausted<UpstreamError>> for FetchError {
  fn from(e: crate::retry::Exhausted<UpstreamError>) -> Self {
    FetchError::ExhaustedRetries { attempts: e.attempts, last: e.last }
  }
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("snapshot io error on {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("snapshot json error on {path}: {source}")]
  Json {
    path: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("snapshot download failed: {0}")]
  Download(#[from] FetchError),
}
