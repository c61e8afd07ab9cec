use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Fetch/decode progress of the current source, shared between a loader
/// thread and the element that reads it. Writers name the generation they
/// were started for and are ignored once [`reset`](Self::reset) moved on.
#[derive(Default, Debug)]
pub struct LoadProgress {
    total_duration_millis: Arc<AtomicU64>,
    duration_known: Arc<AtomicBool>,
    total_bytes: Arc<AtomicU64>,
    buffered_bytes: Arc<AtomicU64>,
    generation: Arc<AtomicU64>,
    publish: Mutex<()>,
}

impl LoadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `write` only while `generation` is still current. Returns
    /// whether it ran.
    fn publish_for(&self, generation: u64, write: impl FnOnce(&Self)) -> bool {
        let _gate = self.gate();
        if !self.is_current(generation) {
            return false;
        }
        write(self);
        true
    }

    pub fn set_total_duration(&self, generation: u64, duration: Duration) -> bool {
        self.publish_for(generation, |progress| {
            progress
                .total_duration_millis
                .store(duration.as_millis() as u64, Ordering::Relaxed);
            progress.duration_known.store(true, Ordering::Release);
        })
    }

    pub fn total_duration(&self) -> Option<Duration> {
        if self.duration_known.load(Ordering::Acquire) {
            Some(Duration::from_millis(
                self.total_duration_millis.load(Ordering::Relaxed),
            ))
        } else {
            None
        }
    }

    pub fn set_total_bytes(&self, generation: u64, bytes: u64) -> bool {
        self.publish_for(generation, |progress| {
            progress.total_bytes.store(bytes, Ordering::Relaxed);
        })
    }

    pub fn set_buffered_bytes(&self, generation: u64, bytes: u64) -> bool {
        self.publish_for(generation, |progress| {
            progress.buffered_bytes.store(bytes, Ordering::Relaxed);
        })
    }

    pub fn buffered_ratio(&self) -> f64 {
        let total = self.total_bytes.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            let buffered = self.buffered_bytes.load(Ordering::Relaxed);
            (buffered as f64 / total as f64).min(1.0)
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Forgets the previous source and returns the generation a new load
    /// must carry to publish anything.
    pub fn reset(&self) -> u64 {
        let _gate = self.gate();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.duration_known.store(false, Ordering::Release);
        self.total_duration_millis.store(0, Ordering::Relaxed);
        self.total_bytes.store(0, Ordering::Relaxed);
        self.buffered_bytes.store(0, Ordering::Relaxed);
        generation
    }
}
