//! # Watcher Registry
//!
//! Process-wide ledger of background-task liveness.
//!
//! Each long-running poller (heartbeat driver, inventory poller, catalog
//! watcher) registers its name exactly once at startup and touches its entry
//! after every poll attempt. The registry is constructed once per process and
//! shared by reference (`Arc<WatcherRegistry>`) with every task that needs it;
//! there is no hidden global table.
//!
//! ## Rules
//! - `register` on a name already present is a wiring bug, not a runtime
//!   condition: it fails with [`WatcherError::AlreadyRegistered`]
//! - `touch` on a name never registered fails with
//!   [`WatcherError::NotRegistered`]
//! - Timestamps come from a monotonic clock and never move backward
//! - Entries are never individually removed; `clear` exists for test isolation

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;
use thiserror::Error;

/// Watcher protocol errors. These indicate wiring bugs at the call site and
/// are not conditions to recover from at runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatcherError {
    #[error("Watcher '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Watcher '{name}' is not registered")]
    NotRegistered { name: String },
}

/// Thread-safe table of watcher names and their last attempt timestamps.
///
/// Concurrent `register`/`touch` calls from independent tasks are safe; no
/// cross-key atomicity is provided or needed. Reads taken while a `touch` is
/// in flight are eventually consistent, which is acceptable for a health
/// signal.
#[derive(Debug, Default)]
pub struct WatcherRegistry {
    entries: RwLock<HashMap<String, Instant>>,
}

impl WatcherRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a watcher under `name` with the current timestamp.
    ///
    /// Fails if `name` is already present; each background task must register
    /// exactly once at startup.
    pub fn register(&self, name: &str) -> Result<(), WatcherError> {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(WatcherError::AlreadyRegistered {
                name: name.to_string(),
            });
        }
        entries.insert(name.to_string(), Instant::now());
        Ok(())
    }

    /// Records a poll attempt for `name`, moving its timestamp to now.
    ///
    /// The clock is monotonic, so the stored timestamp never regresses.
    pub fn touch(&self, name: &str) -> Result<(), WatcherError> {
        let mut entries = self.entries.write();
        match entries.get_mut(name) {
            Some(last_attempt) => {
                *last_attempt = Instant::now();
                Ok(())
            }
            None => Err(WatcherError::NotRegistered {
                name: name.to_string(),
            }),
        }
    }

    /// Returns a consistent point-in-time copy of all entries.
    pub fn snapshot(&self) -> HashMap<String, Instant> {
        self.entries.read().clone()
    }

    /// Number of registered watchers.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every entry. Intended only for test isolation; a production
    /// process never unregisters watchers.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Backdates a watcher's timestamp for staleness tests.
    #[cfg(test)]
    pub(crate) fn touch_at(&self, name: &str, at: Instant) -> Result<(), WatcherError> {
        let mut entries = self.entries.write();
        match entries.get_mut(name) {
            Some(last_attempt) => {
                *last_attempt = at;
                Ok(())
            }
            None => Err(WatcherError::NotRegistered {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn register_then_touch_succeeds() {
        let registry = WatcherRegistry::new();
        registry.register("job_watcher").unwrap();
        registry.touch("job_watcher").unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_register_fails() {
        let registry = WatcherRegistry::new();
        registry.register("job_watcher").unwrap();

        let err = registry.register("job_watcher").unwrap_err();
        assert_eq!(
            err,
            WatcherError::AlreadyRegistered {
                name: "job_watcher".to_string()
            }
        );
    }

    #[test]
    fn touch_unregistered_fails() {
        let registry = WatcherRegistry::new();
        let err = registry.touch("ghost_watcher").unwrap_err();
        assert_eq!(
            err,
            WatcherError::NotRegistered {
                name: "ghost_watcher".to_string()
            }
        );
    }

    #[test]
    fn touch_never_regresses_timestamp() {
        let registry = WatcherRegistry::new();
        registry.register("job_watcher").unwrap();

        let mut previous = registry.snapshot()["job_watcher"];
        for _ in 0..10 {
            registry.touch("job_watcher").unwrap();
            let current = registry.snapshot()["job_watcher"];
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn clear_resets_registry() {
        let registry = WatcherRegistry::new();
        registry.register("a").unwrap();
        registry.register("b").unwrap();
        registry.clear();
        assert!(registry.is_empty());

        // Names can be reused after a clear.
        registry.register("a").unwrap();
    }

    #[test]
    fn concurrent_touches_do_not_corrupt() {
        let registry = Arc::new(WatcherRegistry::new());
        for i in 0..8 {
            registry.register(&format!("watcher_{i}")).unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let name = format!("watcher_{i}");
                    for _ in 0..100 {
                        registry.touch(&name).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }
}
