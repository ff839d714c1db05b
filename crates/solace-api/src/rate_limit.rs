//! Fixed-window request limits keyed by client address and action.
//!
//! Counters live behind the [`RateLimitStore`] trait. The default
//! [`MemoryRateLimitStore`] is process-local and forgets everything on
//! restart; a shared store can be dropped in for multi-instance deployments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Windows kept before expired entries are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// State of a key's current window after counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    pub count: u32,
    pub resets_in: Duration,
}

/// Counter storage for the limiter.
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `key` and report the window it landed in.
    fn hit(&self, key: &str, window: Duration, now: Instant) -> WindowHit;
}

struct Window {
    started: Instant,
    count: u32,
}

#[derive(Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn hit(&self, key: &str, window: Duration, now: Instant) -> WindowHit {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() >= SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;

        WindowHit {
            count: entry.count,
            resets_in: window.saturating_sub(now.duration_since(entry.started)),
        }
    }
}

/// Read endpoints and write endpoints have separate budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub max: u32,
    pub window: Duration,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    read: Limit,
    write: Limit,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, read: Limit, write: Limit) -> Self {
        Self { store, read, write }
    }

    /// Shared window length, counted in memory.
    pub fn in_memory(read_max: u32, write_max: u32, window: Duration) -> Self {
        Self::new(
            Arc::new(MemoryRateLimitStore::new()),
            Limit {
                max: read_max,
                window,
            },
            Limit {
                max: write_max,
                window,
            },
        )
    }

    pub fn check(&self, access: Access, action: &str, client: &str) -> Result<(), ApiError> {
        self.check_at(access, action, client, Instant::now())
    }

    pub fn check_at(
        &self,
        access: Access,
        action: &str,
        client: &str,
        now: Instant,
    ) -> Result<(), ApiError> {
        let limit = match access {
            Access::Read => self.read,
            Access::Write => self.write,
        };
        let key = format!("{client}:{action}");
        let hit = self.store.hit(&key, limit.window, now);
        if hit.count <= limit.max {
            return Ok(());
        }

        let retry_after = hit.resets_in.as_secs_f64().ceil().max(1.0) as u64;
        tracing::warn!(client, action, count = hit.count, retry_after, "rate limit exceeded");
        Err(ApiError::RateLimited { retry_after })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::in_memory(60, 20, Duration::from_secs(60))
    }
}
