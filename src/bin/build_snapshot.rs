//! Offline snapshot builder.
//!
//! Downloads the full Codeforces problemset once, samples it per rating
//! bucket and writes the artifact the service loads as its last-resort tier.
//! Uses the same config sources as the service (`[builder]` table, CF_HOSTS,
//! SNAPSHOT_PATH). Exits non-zero only when the download fails and no
//! earlier snapshot exists.

use std::process::ExitCode;

use tracing::{error, info};

use algoquest_backend::codeforces::Codeforces;
use algoquest_backend::config::{ServiceConfig, UpstreamConfig};
use algoquest_backend::snapshot::{build_snapshot, BuildReport};
use algoquest_backend::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
  telemetry::init_tracing();

  let cfg = ServiceConfig::load_from_env();
  let upstream = UpstreamConfig { user_agent: cfg.builder.user_agent.clone(), ..cfg.upstream.clone() };
  let cf = match Codeforces::from_config(&upstream) {
    Ok(cf) => cf,
    Err(e) => {
      error!(target: "snapshot", error = %e, "Could not build HTTP client");
      return ExitCode::FAILURE;
    }
  };

  info!(target: "snapshot", out = %cfg.snapshot_path.display(), "Building local CF snapshot");
  match build_snapshot(&cf, &cfg.builder, &cfg.snapshot_path).await {
    Ok(BuildReport::Written { count }) => {
      info!(target: "snapshot", count, out = %cfg.snapshot_path.display(), "Done");
      ExitCode::SUCCESS
    }
    Ok(BuildReport::KeptExisting) => {
      info!(target: "snapshot", out = %cfg.snapshot_path.display(), "Keeping existing snapshot");
      ExitCode::SUCCESS
    }
    Err(e) => {
      error!(target: "snapshot", error = %e, "Snapshot build failed");
      ExitCode::FAILURE
    }
  }
}
