//! Stage timing reported to a caller-supplied observer.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Receives the duration of named processing stages.
pub trait TimingObserver: Send + Sync {
    fn record(&self, stage: &'static str, elapsed: Duration);
}

/// Discards all timings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTimer;

impl TimingObserver for NoopTimer {
    fn record(&self, _stage: &'static str, _elapsed: Duration) {}
}

/// Logs timings at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTimer;

impl TimingObserver for TracingTimer {
    fn record(&self, stage: &'static str, elapsed: Duration) {
        debug!("{} took {:.3} ms", stage, elapsed.as_secs_f64() * 1000.0);
    }
}

/// Collects timings in memory, owned by one request.
#[derive(Debug, Default)]
pub struct TimingCollector {
    entries: Mutex<Vec<(&'static str, Duration)>>,
}

impl TimingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded stages in the order they finished.
    pub fn entries(&self) -> Vec<(&'static str, Duration)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sum of all recorded durations for a stage.
    pub fn total(&self, stage: &str) -> Duration {
        self.entries()
            .into_iter()
            .filter(|(name, _)| *name == stage)
            .map(|(_, elapsed)| elapsed)
            .sum()
    }
}

impl TimingObserver for TimingCollector {
    fn record(&self, stage: &'static str, elapsed: Duration) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push((stage, elapsed)),
            Err(poisoned) => poisoned.into_inner().push((stage, elapsed)),
        }
    }
}

/// Run `f` and report its duration under `stage`.
pub fn timed<T>(observer: &dyn TimingObserver, stage: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    observer.record(stage, start.elapsed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_stages() {
        let collector = TimingCollector::new();
        let value = timed(&collector, "classify", || 42);
        timed(&collector, "lookup", || ());
        timed(&collector, "lookup", || ());

        assert_eq!(value, 42);
        let stages: Vec<_> = collector.entries().iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, vec!["classify", "lookup", "lookup"]);
        assert!(collector.total("missing").is_zero());
    }
}
