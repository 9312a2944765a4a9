//! Retry with linear backoff.
//!
//! One combinator shared by the per-tag fetch, the dump fetch and the
//! snapshot builder's download: `attempts` tries, sleeping `base × n` after the
//! n-th failure (no sleep after the last one). The sleep yields to the runtime.

use std::{future::Future, time::Duration};

use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
  pub attempts: u32,
  pub base_delay: Duration,
}

impl RetryPolicy {
  pub fn new(attempts: u32, base_delay: Duration) -> Self {
    Self { attempts: attempts.max(1), base_delay }
  }

  /// Delay after the failure of attempt `attempt` (1-based).
  pub fn delay_after(&self, attempt: u32) -> Duration {
    self.base_delay * attempt
  }
}

/// Every attempt failed; `last` is the final attempt's error.
#[derive(Debug)]
pub struct Exhausted<E> {
  pub attempts: u32,
  pub last: E,
}

pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T, Exhausted<E>>
where
  F: FnMut(u32) -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: std::fmt::Display,
{
  let attempts = policy.attempts.max(1);
  let mut attempt = 1;
  loop {
    match op(attempt).await {
      Ok(v) => return Ok(v),
      Err(e) if attempt >= attempts => return Err(Exhausted { attempts, last: e }),
      Err(e) => {
        let delay = policy.delay_after(attempt);
        warn!(target: "upstream", %label, attempt, of = attempts, ?delay, error = %e, "Attempt failed; backing off");
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
    }
  }
}
