//! Periodic Cache Sweeper
//!
//! Background task that clears a cache wholesale on a fixed interval.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{AccountedCache, EstimateSize};

// == Sweep Target ==
/// Something the sweeper can flush.
pub trait Sweep: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Clears every entry and resets accounting, returning how many were removed.
    fn sweep(&self) -> usize;

    fn memory_used(&self) -> u64;
}

impl<K, V> Sweep for AccountedCache<K, V>
where
    K: Eq + Hash + Copy + Debug + Send + Sync + 'static,
    V: Clone + EstimateSize + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        AccountedCache::name(self)
    }

    fn sweep(&self) -> usize {
        self.clear()
    }

    fn memory_used(&self) -> u64 {
        AccountedCache::memory_used(self)
    }
}

// == Periodic Sweeper ==
/// Schedule shared by the sweeper tasks it starts.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicSweeper {
    interval: Duration,
}

impl PeriodicSweeper {
    /// Creates a sweeper firing every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns a task sweeping `target` every interval until stopped.
    ///
    /// The first sweep happens one full interval after start. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, target: Arc<dyn Sweep>) -> SweeperHandle {
        let interval = self.interval;
        let name = target.name();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let trigger = Arc::new(Notify::new());
        let manual = Arc::clone(&trigger);

        let task = tokio::spawn(async move {
            info!(
                "Starting sweeper for {} cache with interval of {} seconds",
                name,
                interval.as_secs()
            );

            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => run_sweep(target.as_ref()),
                    _ = manual.notified() => run_sweep(target.as_ref()),
                }
            }

            debug!("Sweeper for {} cache exited", name);
        });

        SweeperHandle {
            name,
            shutdown: shutdown_tx,
            trigger,
            task: Mutex::new(Some(task)),
        }
    }
}

fn run_sweep(target: &dyn Sweep) {
    let used = target.memory_used();
    let removed = target.sweep();
    info!(
        "Clearing the {} cache: removed {} entries ({} bytes accounted)",
        target.name(),
        removed,
        used
    );
}

// == Sweeper Handle ==
/// Lifecycle handle of a running sweeper task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct SweeperHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    trigger: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SweeperHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Requests an immediate sweep, independent of the schedule.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    // == Stop ==
    /// Signals the task to exit. Safe to call any number of times.
    pub fn stop(&self) {
        if !self.shutdown.send_replace(true) {
            warn!("Sweeper for {} cache stopped", self.name);
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
