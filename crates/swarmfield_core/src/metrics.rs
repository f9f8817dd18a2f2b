//! Diagnostics for hosts that drive the kernel.
//!
//! The kernel functions never touch these counters themselves; a host owns a
//! [`KernelMetrics`] and records what it did each tick.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use web_time::Instant;

/// Caller-owned counters for field steps, deposits and index rebuilds.
pub struct KernelMetrics {
    field_steps: AtomicU64,
    deposits_accepted: AtomicU64,
    deposits_rejected: AtomicU64,
    index_builds: AtomicU64,
    last_cell_count: AtomicUsize,
    last_total_mass: AtomicF32,
    log_interval: u64,
    start_time: Instant,
}

impl Default for KernelMetrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl KernelMetrics {
    /// Creates a collector that logs a summary every `log_interval` steps.
    #[must_use]
    pub fn new(log_interval: u64) -> Self {
        Self {
            field_steps: AtomicU64::new(0),
            deposits_accepted: AtomicU64::new(0),
            deposits_rejected: AtomicU64::new(0),
            index_builds: AtomicU64::new(0),
            last_cell_count: AtomicUsize::new(0),
            last_total_mass: AtomicF32::new(0.0),
            log_interval: log_interval.max(1),
            start_time: Instant::now(),
        }
    }

    /// Records a completed field step and the field's mass afterwards.
    pub fn record_field_step(&self, duration: Duration, total_mass: f32) {
        let steps = self.field_steps.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_total_mass.store(total_mass, Ordering::Relaxed);

        if steps % self.log_interval == 0 {
            tracing::info!(
                steps = steps,
                total_mass = total_mass,
                duration_us = duration.as_micros() as u64,
                deposits_accepted = self.deposits_accepted(),
                deposits_rejected = self.deposits_rejected(),
                "Pheromone field"
            );
        }
    }

    /// Records the outcome of one `deposit` call.
    pub fn record_deposit(&self, accepted: bool) {
        if accepted {
            self.deposits_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.deposits_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a spatial hash rebuild with its non-empty bucket count.
    pub fn record_index_build(&self, entities: usize, cell_count: usize) {
        self.index_builds.fetch_add(1, Ordering::Relaxed);
        self.last_cell_count.store(cell_count, Ordering::Relaxed);
        tracing::debug!(entities, cell_count, "Spatial index rebuilt");
    }

    #[must_use]
    pub fn field_steps(&self) -> u64 {
        self.field_steps.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deposits_accepted(&self) -> u64 {
        self.deposits_accepted.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deposits_rejected(&self) -> u64 {
        self.deposits_rejected.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn index_builds(&self) -> u64 {
        self.index_builds.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn last_cell_count(&self) -> usize {
        self.last_cell_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn last_total_mass(&self) -> f32 {
        self.last_total_mass.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
