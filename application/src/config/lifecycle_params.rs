//! Lifecycle parameters: orchestrator timing and retry control.
//!
//! [`LifecycleParams`] groups the static parameters that control the vote
//! lifecycle use case: how long in-memory state lives and how manual results
//! are re-queued when an evaluation of the same item is already running.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestrator timing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleParams {
    /// Idle time after which a single-flight entry is forgotten.
    pub guard_idle_ttl: Duration,
    /// Lifetime of a cached alternates map.
    pub alternates_cache_ttl: Duration,
    /// Delay before a contended manual result is retried.
    pub requeue_delay: Duration,
    /// Maximum retries for a contended manual result.
    pub max_requeue_attempts: u32,
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            guard_idle_ttl: Duration::from_secs(6 * 60 * 60),
            alternates_cache_ttl: Duration::from_secs(24 * 60 * 60),
            requeue_delay: Duration::from_secs(5),
            max_requeue_attempts: 5,
        }
    }
}

impl LifecycleParams {
    // ==================== Builder Methods ====================

    pub fn with_guard_idle_ttl(mut self, ttl: Duration) -> Self {
        self.guard_idle_ttl = ttl;
        self
    }

    pub fn with_alternates_cache_ttl(mut self, ttl: Duration) -> Self {
        self.alternates_cache_ttl = ttl;
        self
    }

    pub fn with_requeue_delay(mut self, delay: Duration) -> Self {
        self.requeue_delay = delay;
        self
    }

    pub fn with_max_requeue_attempts(mut self, max: u32) -> Self {
        self.max_requeue_attempts = max;
        self
    }
}
