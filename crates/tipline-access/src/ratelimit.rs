//! Rate-limit collaborator contract
//!
//! `verify` must be short-circuited before any hash comparison once a key
//! (case id or client origin) exhausts its attempts. The contract requires
//! atomic increment-and-check per key; [`FixedWindowLimiter`] is the
//! in-process implementation, a distributed backend satisfies the same
//! trait.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tipline_core::{TiplineError, TiplineResult};

pub trait RateLimiter: Send + Sync {
    /// Atomically count one attempt for `key`; `Err(RateLimited)` once the
    /// window's budget is spent.
    fn check(&self, key: &str) -> TiplineResult<()>;
}

/// Fixed-window counter per key.
pub struct FixedWindowLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindowLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &tipline_core::config::AccessConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.window_secs))
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str) -> TiplineResult<()> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| TiplineError::Storage("rate limit lock poisoned".into()))?;

        let now = Instant::now();

        // Keys are attacker-controlled (case ids, client origins), so expired
        // windows must not accumulate: sweep them before counting.
        windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        let entry = windows.entry(key.to_string()).or_insert((now, 0));

        if entry.1 >= self.max_attempts {
            tracing::warn!(key, "rate limit exceeded");
            return Err(TiplineError::RateLimited);
        }

        entry.1 += 1;
        Ok(())
    }
}
