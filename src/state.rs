//! Application state, built once at process start and shared by reference.
//!
//! This owns:
//!   - the service configuration
//!   - the Codeforces client (hosts + retry budgets)
//!   - the per-query result cache and the full-dump cache (injected clock)
//!   - the read-only snapshot store

use std::sync::Arc;

use tracing::{info, instrument};

use crate::cache::{Clock, DumpCache, ResultCache, SystemClock};
use crate::codeforces::Codeforces;
use crate::config::ServiceConfig;
use crate::snapshot::SnapshotStore;

pub struct AppState {
    pub cfg: ServiceConfig,
    pub cf: Codeforces,
    pub results: ResultCache,
    pub dump: DumpCache,
    pub snapshot: SnapshotStore,
}

impl AppState {
    /// Production wiring: wall clock + snapshot loaded from `cfg.snapshot_path`.
    #[instrument(level = "info", skip_all)]
    pub fn new(cfg: ServiceConfig) -> Result<Self, reqwest::Error> {
        let snapshot = SnapshotStore::load(&cfg.snapshot_path);
        Self::with_parts(cfg, Arc::new(SystemClock), snapshot)
    }

    pub fn with_parts(
        cfg: ServiceConfig,
        clock: Arc<dyn Clock>,
        snapshot: SnapshotStore,
    ) -> Result<Self, reqwest::Error> {
        let cf = Codeforces::from_config(&cfg.upstream)?;
        let results = ResultCache::new(cfg.cache.result_ttl(), clock.clone());
        let dump = DumpCache::new(cfg.cache.dump_ttl(), clock);

        info!(
            target: "algoquest_backend",
            hosts = ?cf.client.hosts(),
            live_attempts = cfg.upstream.live_attempts,
            dump_attempts = cfg.upstream.dump_attempts,
            result_ttl = ?cfg.cache.result_ttl(),
            dump_ttl = ?cfg.cache.dump_ttl(),
            snapshot = snapshot.len(),
            "Problem service ready"
        );

        Ok(Self { cfg, cf, results, dump, snapshot })
    }
}
