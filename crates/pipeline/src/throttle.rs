//! Fixed-interval pacing between rows.

use std::time::Duration;

/// Enforces the minimum spacing between entity iterations.  The pause runs
/// after every row, success or failure — it is the only rate control the
/// pipeline has against either external service, so it stays unconditional.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        tokio::time::sleep(self.interval).await;
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
