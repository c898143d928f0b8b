// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via
// [`set_match_metrics`]; every `FaqMatcher::find_best_match` call then reports
// its latency and outcome. Instrumentation stays decoupled from any specific
// metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for match operations.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of one `find_best_match` call.
    ///
    /// `candidates` is the size of the FAQ list, `scored` the number of
    /// entries that went through the edit-distance computation after
    /// prefiltering, and `hit` whether an entry met the threshold.
    fn record_match(&self, latency: Duration, candidates: usize, scored: usize, hit: bool);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// This is typically called once during service startup.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
