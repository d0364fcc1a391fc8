//! Observational hooks out of the search loop. Nothing here affects results.

/// Periodic notifications from running partitions. Implementations are
/// called from worker threads and must be cheap.
pub trait ProgressObserver: Sync {
    /// A partition improved on its local best.
    fn on_local_best(&self, partition: usize, length_m: f64, order: &[usize]) {
        let _ = (partition, length_m, order);
    }

    /// Periodic ping, every `progress_interval` evaluated candidates.
    fn on_progress(&self, partition: usize, examined: u64, budget: u64, best_m: f64) {
        let _ = (partition, examined, budget, best_m);
    }
}

/// Default observer: renders everything through `log` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_local_best(&self, partition: usize, length_m: f64, order: &[usize]) {
        log::debug!("search: partition={partition} local_best_m={length_m:.0} order={order:?}");
    }

    fn on_progress(&self, partition: usize, examined: u64, budget: u64, best_m: f64) {
        let percent = examined as f64 / budget.max(1) as f64 * 100.0;
        log::debug!(
            "search: partition={partition} examined={examined} of {budget} ({percent:.4}%) best_m={best_m:.0}"
        );
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}
