//! Cache Store Module
//!
//! Owns one strategy instance and its background expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{
    CacheControl, CacheEntry, CacheStats, CacheStrategy, KeyPattern, SharedClock, Strategy,
    StrategyKind,
};
use crate::tasks::spawn_sweep_task;

/// Default time between expiry sweep passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// == Cache Store ==
/// A strategy shared between foreground calls and the expiry sweep.
///
/// Each call takes the lock once and runs to completion, so a sweep pass can
/// land between two calls but never inside one.
#[derive(Debug)]
pub struct CacheStore<V> {
    strategy: Arc<Mutex<Strategy<V>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> CacheStore<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a store without a background sweep.
    ///
    /// # Arguments
    /// * `kind` - Eviction policy
    /// * `max_size` - Maximum number of entries
    /// * `clock` - Time source for stamping and expiring entries
    pub fn new(kind: StrategyKind, max_size: usize, clock: SharedClock) -> Self {
        Self {
            strategy: Arc::new(Mutex::new(Strategy::new(kind, max_size, clock))),
            sweeper: Mutex::new(None),
        }
    }

    /// Creates a store and starts its expiry sweep.
    pub fn with_sweep(
        kind: StrategyKind,
        max_size: usize,
        clock: SharedClock,
        interval: Duration,
    ) -> Self {
        let store = Self::new(kind, max_size, clock);
        store.start_sweep(interval);
        store
    }

    // == Start Sweep ==
    /// Starts the background sweep if it is not already running.
    ///
    /// Returns true if a sweep is running afterwards.
    pub fn start_sweep(&self, interval: Duration) -> bool {
        let mut sweeper = self.sweeper.lock();
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return true;
        }

        *sweeper = spawn_sweep_task(Arc::downgrade(&self.strategy), interval);
        sweeper.is_some()
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        self.strategy.lock().get(key)
    }

    pub fn set(
        &self,
        key: &str,
        value: V,
        ttl_seconds: u64,
        cache_control: Option<CacheControl>,
    ) -> CacheEntry<V> {
        self.strategy
            .lock()
            .set(key, value, ttl_seconds, cache_control)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.strategy.lock().delete(key)
    }

    pub fn clear(&self) {
        self.strategy.lock().clear();
    }

    pub fn size(&self) -> usize {
        self.strategy.lock().size()
    }

    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let removed = self.strategy.lock().invalidate(pattern);
        debug!("Invalidated {} entries matching {:?}", removed, pattern);
        removed
    }

    /// Runs one expiry pass immediately.
    pub fn purge_expired(&self) -> usize {
        self.strategy.lock().purge_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.strategy.lock().stats()
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.lock().kind()
    }

    pub fn max_size(&self) -> usize {
        self.strategy.lock().max_size()
    }
}

impl<V> CacheStore<V> {
    // == Dispose ==
    /// Stops the background sweep. Idempotent.
    pub fn dispose(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            info!("Cache expiry sweep stopped");
        }
    }
}

impl<V> Drop for CacheStore<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}
