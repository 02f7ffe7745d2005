//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, whether
//! or not anyone reads them again.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStrategy, Strategy};

/// Spawns a background task that periodically purges expired entries.
///
/// The task holds only a weak reference to the strategy: it exits on its own
/// once the owning store is dropped, and it never keeps the store alive.
/// Tokio does not wait for spawned tasks at shutdown, so an idle sweep never
/// delays process exit.
///
/// # Arguments
/// * `strategy` - Weak reference to the store's strategy
/// * `interval` - Time between sweep passes
///
/// # Returns
/// `None` if the interval is zero or no tokio runtime is running; otherwise
/// a JoinHandle that `dispose` aborts.
pub fn spawn_sweep_task<V>(
    strategy: Weak<Mutex<Strategy<V>>>,
    interval: Duration,
) -> Option<JoinHandle<()>>
where
    V: Clone + Send + 'static,
{
    if interval.is_zero() {
        warn!("Cache sweep disabled: interval is zero");
        return None;
    }

    let runtime = match Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!("Cache sweep not started: no tokio runtime available, relying on lazy expiry");
            return None;
        }
    };

    let handle = runtime.spawn(async move {
        info!(
            "Starting cache expiry sweep with interval of {} seconds",
            interval.as_secs_f64()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(strategy) = strategy.upgrade() else {
                debug!("Cache dropped, stopping expiry sweep");
                break;
            };

            let removed = strategy.lock().purge_expired();

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    });

    Some(handle)
}
