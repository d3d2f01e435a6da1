use std::sync::{Arc, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::event::AppEvent;

/// Cancellation handle for a repeating tick source. Dropping it cancels.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// A shared view of the cancellation flag, for the tick source itself.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub trait TickScheduler {
    /// Start a one-tick-per-period source stamped with `generation`.
    fn schedule(&mut self, generation: u64) -> TickHandle;
}

/// Sends `AppEvent::Tick` from a background thread.
pub struct ThreadTicker {
    tx: Sender<AppEvent>,
    period: Duration,
}

impl ThreadTicker {
    pub fn new(tx: Sender<AppEvent>, period: Duration) -> Self {
        Self { tx, period }
    }
}

impl TickScheduler for ThreadTicker {
    fn schedule(&mut self, generation: u64) -> TickHandle {
        let handle = TickHandle::new(generation);
        let cancelled = handle.flag();
        let tx = self.tx.clone();
        let period = self.period;
        thread::spawn(move || {
            loop {
                thread::sleep(period);
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                if tx.send(AppEvent::Tick { generation }).is_err() {
                    return;
                }
            }
        });
        handle
    }
}

/// Scheduler that never fires on its own; the owner drives ticks by hand.
///
/// Clones share the record of issued handles, so a test can keep one clone
/// while the controller owns another.
#[derive(Clone, Default)]
pub struct ManualTicker {
    issued: Arc<Mutex<Vec<(u64, Arc<AtomicBool>)>>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    fn issued(&self) -> MutexGuard<'_, Vec<(u64, Arc<AtomicBool>)>> {
        self.issued.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Generations whose handle has not been cancelled.
    pub fn live_generations(&self) -> Vec<u64> {
        self.issued()
            .iter()
            .filter(|(_, flag)| !flag.load(Ordering::SeqCst))
            .map(|(generation, _)| *generation)
            .collect()
    }

    pub fn issued_count(&self) -> usize {
        self.issued().len()
    }
}

impl TickScheduler for ManualTicker {
    fn schedule(&mut self, generation: u64) -> TickHandle {
        let handle = TickHandle::new(generation);
        self.issued().push((generation, handle.flag()));
        handle
    }
}
