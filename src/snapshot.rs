//! Static last-resort dataset.
//!
//! `SnapshotStore` is loaded once at start and read-only afterwards; a missing
//! or unreadable artifact yields an empty store, never a startup failure.
//!
//! `SnapshotPlan` is the offline stratified sampler used by the
//! `build-snapshot` binary: rating filter, fixed buckets, per-bucket shuffle
//! and cap of `ceil(target / buckets)`, de-dup, final shuffle and cap.

use std::{
  collections::HashSet,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use rand::{seq::SliceRandom, Rng};
use tracing::{error, info, instrument, warn};

use crate::codeforces::Codeforces;
use crate::config::BuilderConfig;
use crate::domain::{Problem, SnapshotRecord};
use crate::error::SnapshotError;
use crate::retry::RetryPolicy;

#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
  records: Arc<Vec<SnapshotRecord>>,
}

impl SnapshotStore {
  pub fn from_records(records: Vec<SnapshotRecord>) -> Self {
    Self { records: Arc::new(records) }
  }

  pub fn read(path: &Path) -> Result<Vec<SnapshotRecord>, SnapshotError> {
    let display = path.display().to_string();
    let s = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io { path: display.clone(), source })?;
    serde_json::from_str(&s).map_err(|source| SnapshotError::Json { path: display, source })
  }

  /// Load the artifact; absence or corruption degrades to an empty store.
  pub fn load(path: &Path) -> Self {
    if !path.exists() {
      warn!(target: "snapshot", path = %path.display(), "No snapshot artifact; snapshot tier will be empty");
      return Self::default();
    }
    match Self::read(path) {
      Ok(records) => {
        info!(target: "snapshot", path = %path.display(), count = records.len(), "Local snapshot loaded");
        Self::from_records(records)
      }
      Err(e) => {
        error!(target: "snapshot", error = %e, "Snapshot load failed; snapshot tier will be empty");
        Self::default()
      }
    }
  }

  pub fn records(&self) -> &[SnapshotRecord] { &self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[derive(Clone, Debug)]
pub struct SnapshotPlan {
  pub min_rating: i64,
  pub max_rating: i64,
  pub target_size: usize,
  /// Half-open `[lo, hi)`.
  pub buckets: Vec<(i64, i64)>,
}

impl From<&BuilderConfig> for SnapshotPlan {
  fn from(c: &BuilderConfig) -> Self {
    Self {
      min_rating: c.min_rating,
      max_rating: c.max_rating,
      target_size: c.target_size,
      buckets: c.buckets.clone(),
    }
  }
}

/// Result of one sampling run.
#[derive(Clone, Debug)]
pub struct Sampled {
  pub records: Vec<SnapshotRecord>,
  /// Records kept per bucket after the per-bucket cap.
  pub bucket_counts: Vec<usize>,
}

impl SnapshotPlan {
  pub fn per_bucket_cap(&self) -> usize {
    if self.buckets.is_empty() {
      return 0;
    }
    self.target_size.div_ceil(self.buckets.len())
  }

  pub fn bucket_of(&self, rating: i64) -> Option<usize> {
    self.buckets.iter().position(|&(lo, hi)| rating >= lo && rating < hi)
  }

  fn eligible(&self, p: &Problem) -> bool {
    matches!(p.rating, Some(r) if r >= self.min_rating && r <= self.max_rating) && !p.tags.is_empty()
  }

  pub fn sample<R: Rng + ?Sized>(&self, problems: Vec<Problem>, rng: &mut R) -> Sampled {
    let cap = self.per_bucket_cap();
    let mut buckets: Vec<Vec<Problem>> = vec![Vec::new(); self.buckets.len()];
    for p in problems.into_iter().filter(|p| self.eligible(p)) {
      if let Some(i) = p.rating.and_then(|r| self.bucket_of(r)) {
        buckets[i].push(p);
      }
    }

    let mut bucket_counts = Vec::with_capacity(buckets.len());
    for (i, b) in buckets.iter_mut().enumerate() {
      b.shuffle(rng);
      b.truncate(cap);
      let (lo, hi) = self.buckets[i];
      info!(target: "snapshot", bucket = i + 1, lo, hi = hi - 1, kept = b.len(), "Bucket sampled");
      bucket_counts.push(b.len());
    }

    let mut seen = HashSet::new();
    let mut picked: Vec<Problem> = buckets
      .into_iter()
      .flatten()
      .filter(|p| {
        let (contest_id, index) = p.key();
        seen.insert((contest_id, index.to_string()))
      })
      .collect();
    picked.shuffle(rng);
    picked.truncate(self.target_size);

    Sampled { records: picked, bucket_counts }
  }
}

/// Write the artifact through a temp file so a failed write never clobbers
/// the previous snapshot.
pub fn persist(records: &[SnapshotRecord], path: &Path) -> Result<(), SnapshotError> {
  let display = path.display().to_string();
  let io = |source: std::io::Error| SnapshotError::Io { path: display.clone(), source };
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir).map_err(io)?;
  }
  let json = serde_json::to_string(records).map_err(|source| SnapshotError::Json { path: display.clone(), source })?;
  let tmp = tmp_path(path);
  std::fs::write(&tmp, json).map_err(io)?;
  std::fs::rename(&tmp, path).map_err(io)?;
  Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
  let mut s = path.as_os_str().to_owned();
  s.push(".tmp");
  PathBuf::from(s)
}

#[derive(Debug, PartialEq, Eq)]
pub enum BuildReport {
  Written { count: usize },
  /// Download failed but an older artifact exists; it was left untouched.
  KeptExisting,
}

/// Download once (with the builder's budget), sample, persist.
/// Fails only when the download fails and there is no prior artifact.
#[instrument(level = "info", skip(cf, cfg), fields(out = %out.display()))]
pub async fn build_snapshot(cf: &Codeforces, cfg: &BuilderConfig, out: &Path) -> Result<BuildReport, SnapshotError> {
  let policy = RetryPolicy::new(cfg.attempts, Duration::from_millis(cfg.retry_base_delay_ms));
  let problems = match cf.fetch_all(policy, Duration::from_millis(cfg.timeout_ms)).await {
    Ok(p) => p,
    Err(e) if out.exists() => {
      warn!(target: "snapshot", error = %e, "Download failed; keeping existing snapshot");
      return Ok(BuildReport::KeptExisting);
    }
    Err(e) => {
      error!(target: "snapshot", error = %e, "Download failed and no previous snapshot exists");
      return Err(SnapshotError::Download(e));
    }
  };

  let downloaded = problems.len();
  let plan = SnapshotPlan::from(cfg);
  let sampled = plan.sample(problems, &mut rand::thread_rng());
  info!(target: "snapshot", downloaded, kept = sampled.records.len(), per_bucket = plan.per_bucket_cap(), "Snapshot sampled");

  persist(&sampled.records, out)?;
  info!(target: "snapshot", count = sampled.records.len(), "Snapshot written");
  Ok(BuildReport::Written { count: sampled.records.len() })
}
