//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries so
//! memory is reclaimed even for cells nobody queries again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{Clock, SharedCache};

// == Sweep Handle ==
/// Owns a running sweep task.
///
/// The task is aborted by [`SweepHandle::stop`] or when the handle is
/// dropped, so a sweep never outlives its owner.
#[derive(Debug)]
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Stops the sweep task.
    pub fn stop(self) {
        self.task.abort();
        info!("Sweep task stopped");
    }

    /// Returns true once the task has terminated.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            self.task.abort();
            debug!("Sweep task stopped");
        }
    }
}

/// Spawns a background task that periodically cleans up expired entries.
///
/// Each tick takes the write lock, calls
/// [`LocationCache::cleanup`](crate::cache::LocationCache::cleanup) and
/// releases it. The first sweep happens one full interval after spawning.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(LocationCache::<Value>::new(config)));
/// let sweep = spawn_sweep_task(cache.clone(), 10_000);
/// // Later, during shutdown:
/// sweep.stop();
/// ```
pub fn spawn_sweep_task<T, C>(cache: SharedCache<T, C>, interval_ms: u64) -> SweepHandle
where
    T: Clone + Send + Sync + 'static,
    C: Clock + 'static,
{
    let period = Duration::from_millis(interval_ms.max(1));

    let task = tokio::spawn(async move {
        info!("Starting expiry sweep task with interval of {} ms", interval_ms);

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup()
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    });

    SweepHandle { task }
}

/// Starts the sweep task if the cache's configuration enables one.
pub async fn start_configured_sweep<T, C>(cache: &SharedCache<T, C>) -> Option<SweepHandle>
where
    T: Clone + Send + Sync + 'static,
    C: Clock + 'static,
{
    let interval_ms = cache.read().await.config().sweep_interval_ms?;
    Some(spawn_sweep_task(cache.clone(), interval_ms))
}
