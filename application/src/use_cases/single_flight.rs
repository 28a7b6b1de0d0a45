//! Single-flight guard registry
//!
//! At most one evaluation of an item runs at a time. [`SingleFlightRegistry`]
//! keeps one flag per item key; [`SingleFlightRegistry::try_acquire`] flips it
//! from idle to in-flight atomically and hands back a [`FlightGuard`] that
//! flips it back when dropped, whether the evaluation succeeded, failed, or
//! panicked.
//!
//! Entries idle for longer than the configured TTL are purged on the next
//! acquisition so the map does not grow without bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug)]
struct FlightEntry {
    in_flight: bool,
    touched: Instant,
}

/// Per-item in-flight flags
#[derive(Debug)]
pub struct SingleFlightRegistry {
    entries: Mutex<HashMap<String, FlightEntry>>,
    idle_ttl: Duration,
}

impl SingleFlightRegistry {
    pub fn new(idle_ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            idle_ttl,
        })
    }

    /// Mark `key` as in flight, unless it already is
    pub fn try_acquire(self: &Arc<Self>, key: &str) -> Option<FlightGuard> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, e| e.in_flight || now.duration_since(e.touched) < self.idle_ttl);

        let entry = entries.entry(key.to_string()).or_insert(FlightEntry {
            in_flight: false,
            touched: now,
        });
        if entry.in_flight {
            trace!("{} already in flight", key);
            return None;
        }
        entry.in_flight = true;
        entry.touched = now;

        Some(FlightGuard {
            registry: Arc::clone(self),
            key: key.to_string(),
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.lock().get(key).is_some_and(|e| e.in_flight)
    }

    /// Number of tracked keys, in flight or idle
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn release(&self, key: &str) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.in_flight = false;
            entry.touched = Instant::now();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, FlightEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its key when dropped
#[derive(Debug)]
pub struct FlightGuard {
    registry: Arc<SingleFlightRegistry>,
    key: String,
}

impl FlightGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let registry = SingleFlightRegistry::new(Duration::from_secs(60));
        let guard = registry.try_acquire("org/repo#1").unwrap();
        assert!(registry.is_in_flight("org/repo#1"));
        assert!(registry.try_acquire("org/repo#1").is_none());

        drop(guard);
        assert!(!registry.is_in_flight("org/repo#1"));
        assert!(registry.try_acquire("org/repo#1").is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let registry = SingleFlightRegistry::new(Duration::from_secs(60));
        let _a = registry.try_acquire("org/repo#1").unwrap();
        assert!(registry.try_acquire("org/repo#2").is_some());
    }

    #[test]
    fn test_idle_entries_expire() {
        let registry = SingleFlightRegistry::new(Duration::ZERO);
        drop(registry.try_acquire("org/repo#1"));
        drop(registry.try_acquire("org/repo#2"));
        // each acquisition purges idle entries before inserting its own
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_in_flight_entries_never_expire() {
        let registry = SingleFlightRegistry::new(Duration::ZERO);
        let _held = registry.try_acquire("org/repo#1").unwrap();
        let _other = registry.try_acquire("org/repo#2").unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.try_acquire("org/repo#1").is_none());
    }

    #[test]
    fn test_concurrent_acquire_single_winner() {
        let registry = SingleFlightRegistry::new(Duration::from_secs(60));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.try_acquire("org/repo#7").map(|g| {
                    std::thread::sleep(Duration::from_millis(50));
                    g.key().to_string()
                }))
            })
            .collect();
        let winners = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .count();
        assert_eq!(winners, 1);
    }
}
