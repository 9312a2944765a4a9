//! Service configuration: TOML file (optional) + environment overrides.
//!
//! The TOML path is read from ALGOQUEST_CONFIG. Every field has a default, so
//! an empty or missing file yields a working configuration. After the file is
//! applied, these env variables win:
//!   PORT          : u16
//!   CF_TIMEOUT    : per-attempt live timeout in milliseconds
//!   CF_HOSTS      : comma-separated upstream base URLs, primary first
//!   SNAPSHOT_PATH : snapshot artifact location
//!   CORS_ORIGIN   : allowed browser origin (any origin when unset)

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "ALGOQUEST_CONFIG";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
  pub port: u16,
  pub cors_origin: Option<String>,
  pub snapshot_path: PathBuf,
  pub upstream: UpstreamConfig,
  pub cache: CacheConfig,
  pub query: QueryDefaults,
  pub builder: BuilderConfig,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      port: 5000,
      cors_origin: None,
      snapshot_path: PathBuf::from("data/cf_snapshot.min.json"),
      upstream: UpstreamConfig::default(),
      cache: CacheConfig::default(),
      query: QueryDefaults::default(),
      builder: BuilderConfig::default(),
    }
  }
}

/// Upstream hosts and the retry budgets used by the live and dump tiers.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
  pub hosts: Vec<String>,
  pub user_agent: String,
  pub timeout_ms: u64,
  /// The dump payload is large; never shorter than `timeout_ms`.
  pub dump_timeout_ms: u64,
  pub live_attempts: u32,
  pub dump_attempts: u32,
  pub retry_base_delay_ms: u64,
  /// Cap on records read from one per-tag upstream answer.
  pub max_live_records: usize,
}

impl Default for UpstreamConfig {
  fn default() -> Self {
    Self {
      hosts: vec![
        "https://codeforces.com".into(),
        "https://mirror.codeforces.com".into(),
      ],
      user_agent: "AlgoQuest/1.0".into(),
      timeout_ms: 25_000,
      dump_timeout_ms: 45_000,
      live_attempts: 3,
      dump_attempts: 2,
      retry_base_delay_ms: 400,
      max_live_records: 10_000,
    }
  }
}

impl UpstreamConfig {
  pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

  pub fn dump_timeout(&self) -> Duration {
    Duration::from_millis(self.dump_timeout_ms.max(self.timeout_ms))
  }

  pub fn retry_base_delay(&self) -> Duration { Duration::from_millis(self.retry_base_delay_ms) }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub result_ttl_secs: u64,
  pub dump_ttl_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { result_ttl_secs: 10 * 60, dump_ttl_secs: 6 * 60 * 60 }
  }
}

impl CacheConfig {
  pub fn result_ttl(&self) -> Duration { Duration::from_secs(self.result_ttl_secs) }
  pub fn dump_ttl(&self) -> Duration { Duration::from_secs(self.dump_ttl_secs) }
}

/// Values substituted for absent or non-numeric query parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
  pub min_rating: i64,
  pub max_rating: i64,
  pub limit: usize,
}

impl Default for QueryDefaults {
  fn default() -> Self {
    Self { min_rating: 0, max_rating: 4000, limit: 20 }
  }
}

/// Knobs for the offline snapshot build.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
  pub min_rating: i64,
  pub max_rating: i64,
  pub target_size: usize,
  /// Half-open `[lo, hi)` rating buckets; contiguous and non-overlapping.
  pub buckets: Vec<(i64, i64)>,
  pub attempts: u32,
  pub retry_base_delay_ms: u64,
  pub timeout_ms: u64,
  pub user_agent: String,
}

impl Default for BuilderConfig {
  fn default() -> Self {
    Self {
      min_rating: 800,
      max_rating: 2200,
      target_size: 1200,
      buckets: vec![
        (800, 1000),
        (1000, 1200),
        (1200, 1400),
        (1400, 1600),
        (1600, 1800),
        (1800, 2201),
      ],
      attempts: 4,
      retry_base_delay_ms: 700,
      timeout_ms: 30_000,
      user_agent: "AlgoQuest/1.0 (snapshot builder)".into(),
    }
  }
}

impl ServiceConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str::<ServiceConfig>(s)
  }

  pub fn from_path(path: &str) -> Result<Self, ConfigError> {
    let s = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
    Self::from_toml_str(&s).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
  }

  /// File (if ALGOQUEST_CONFIG is set and readable) then env overrides.
  /// Config problems are logged and never stop the process.
  pub fn load_from_env() -> Self {
    let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
      Ok(path) => match Self::from_path(&path) {
        Ok(cfg) => {
          info!(target: "algoquest_backend", %path, "Loaded service config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "algoquest_backend", %path, error = %e, "Config unusable; using defaults");
          Self::default()
        }
      },
      Err(_) => Self::default(),
    };
    cfg.apply_overrides(|key| std::env::var(key).ok());
    cfg
  }

  /// Apply env-style overrides through `get`. Unparseable values are ignored.
  pub fn apply_overrides<F>(&mut self, get: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(port) = get("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
      self.port = port;
    }
    if let Some(ms) = get("CF_TIMEOUT").and_then(|t| t.trim().parse::<u64>().ok()) {
      self.upstream.timeout_ms = ms;
    }
    if let Some(hosts) = get("CF_HOSTS") {
      let hosts: Vec<String> = hosts
        .split(',')
        .map(|h| h.trim().trim_end_matches('/').to_string())
        .filter(|h| !h.is_empty())
        .collect();
      if !hosts.is_empty() {
        self.upstream.hosts = hosts;
      }
    }
    if let Some(path) = get("SNAPSHOT_PATH").filter(|p| !p.trim().is_empty()) {
      self.snapshot_path = PathBuf::from(path);
    }
    if let Some(origin) = get("CORS_ORIGIN").filter(|o| !o.trim().is_empty()) {
      self.cors_origin = Some(origin);
    }
  }
}
