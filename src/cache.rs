//! Two-tier caching with an injected clock.
//!
//! - `TtlCache<V>` backs the per-query `ResultCache` (short TTL).
//! - `DumpCache` holds the whole upstream dataset (long TTL).
//!
//! An entry is valid iff `now - stored_at < ttl`. Expired entries are treated
//! as misses and purged lazily by the read that finds them.
//!
//! Concurrent misses on a cold key may both fetch; the last writer wins.
//! Values for the same key are equivalent, so this only costs upstream calls.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::Problem;
use crate::protocol::ProblemOut;

pub trait Clock: Send + Sync {
  fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant { Instant::now() }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  base: Instant,
  offset: Mutex<Duration>,
}

impl ManualClock {
  pub fn new() -> Self {
    Self { base: Instant::now(), offset: Mutex::new(Duration::ZERO) }
  }

  pub fn advance(&self, by: Duration) {
    let mut off = self.offset.lock().unwrap_or_else(|p| p.into_inner());
    *off += by;
  }
}

impl Default for ManualClock {
  fn default() -> Self { Self::new() }
}

impl Clock for ManualClock {
  fn now(&self) -> Instant {
    let off = self.offset.lock().unwrap_or_else(|p| p.into_inner());
    self.base + *off
  }
}

#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
  pub value: V,
  pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
  fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(self.stored_at) < ttl
  }
}

/// String-keyed TTL map. Keys are used byte-for-byte.
pub struct TtlCache<V> {
  entries: RwLock<HashMap<String, CacheEntry<V>>>,
  ttl: Duration,
  clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
  pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    Self { entries: RwLock::new(HashMap::new()), ttl, clock }
  }

  pub async fn get(&self, key: &str) -> Option<V> {
    let now = self.clock.now();
    {
      let entries = self.entries.read().await;
      match entries.get(key) {
        None => return None,
        Some(e) if e.is_fresh(now, self.ttl) => return Some(e.value.clone()),
        Some(_) => {}
      }
    }
    // Expired: purge unless someone refreshed it in between.
    let mut entries = self.entries.write().await;
    if let Some(e) = entries.get(key) {
      if e.is_fresh(now, self.ttl) {
        return Some(e.value.clone());
      }
      entries.remove(key);
      debug!(target: "problems", %key, "Expired cache entry purged");
    }
    None
  }

  pub async fn set(&self, key: String, value: V) {
    let stored_at = self.clock.now();
    self.entries.write().await.insert(key, CacheEntry { value, stored_at });
  }

  /// Entries physically present, expired or not.
  pub async fn len(&self) -> usize { self.entries.read().await.len() }

  pub async fn is_empty(&self) -> bool { self.entries.read().await.is_empty() }
}

/// Final filtered/paginated answers keyed by `tag|min|max|limit`.
pub type ResultCache = TtlCache<Arc<Vec<ProblemOut>>>;

/// The full upstream dataset with its fetch time.
pub struct DumpCache {
  slot: RwLock<Option<CacheEntry<Arc<Vec<Problem>>>>>,
  ttl: Duration,
  clock: Arc<dyn Clock>,
}

impl DumpCache {
  pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    Self { slot: RwLock::new(None), ttl, clock }
  }

  pub async fn get_fresh(&self) -> Option<Arc<Vec<Problem>>> {
    let now = self.clock.now();
    let slot = self.slot.read().await;
    slot.as_ref().filter(|e| e.is_fresh(now, self.ttl)).map(|e| e.value.clone())
  }

  /// Replace dataset and timestamp in one step.
  pub async fn store(&self, problems: Vec<Problem>) -> Arc<Vec<Problem>> {
    let value = Arc::new(problems);
    let entry = CacheEntry { value: value.clone(), stored_at: self.clock.now() };
    *self.slot.write().await = Some(entry);
    value
  }

  /// Serve the cached dataset if fresh, otherwise run `fetch` and store its result.
  /// No lock is held while `fetch` runs.
  pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<Arc<Vec<Problem>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Problem>, E>>,
  {
    if let Some(hit) = self.get_fresh().await {
      debug!(target: "problems", count = hit.len(), "Dump cache hit");
      return Ok(hit);
    }
    let problems = fetch().await?;
    let stored = self.store(problems).await;
    info!(target: "problems", count = stored.len(), "Live dump cached");
    Ok(stored)
  }
}
