//! Slow-path counters for [`LazySingleton`](crate::singleton::LazySingleton).
//!
//! Nothing here is touched on the fast path.  Every increment happens while
//! the holder's mutex is held; a snapshot reads without the lock, so its
//! counters are each exact but not taken at one instant.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A point-in-time copy of a holder's slow-path counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingletonStats {
    /// Times a caller missed the fast path and took the lock.
    pub lock_acquisitions: usize,
    /// Times the initializer was run.
    pub construction_attempts: usize,
    /// Times the initializer returned an error or panicked.
    pub construction_failures: usize,
    /// Times an instance was published.  At most one.
    pub construction_successes: usize,
}

impl SingletonStats {
    /// Number of constructions that produced an instance.  At most one.
    ///
    /// Counted at publication, so an attempt still in progress is neither a
    /// success nor a failure.
    pub fn successful_constructions(&self) -> usize {
        self.construction_successes
    }
}

impl fmt::Display for SingletonStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "locks={} attempts={} failures={} successes={}",
            self.lock_acquisitions,
            self.construction_attempts,
            self.construction_failures,
            self.construction_successes
        )
    }
}

#[derive(Debug)]
pub(crate) struct Counters {
    lock_acquisitions: AtomicUsize,
    construction_attempts: AtomicUsize,
    construction_failures: AtomicUsize,
    construction_successes: AtomicUsize,
}

impl Counters {
    pub(crate) const fn new() -> Self {
        Self {
            lock_acquisitions: AtomicUsize::new(0),
            construction_attempts: AtomicUsize::new(0),
            construction_failures: AtomicUsize::new(0),
            construction_successes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn record_lock(&self) {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_attempt(&self) {
        self.construction_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.construction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.construction_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SingletonStats {
        SingletonStats {
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
            construction_attempts: self.construction_attempts.load(Ordering::Relaxed),
            construction_failures: self.construction_failures.load(Ordering::Relaxed),
            construction_successes: self.construction_successes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_records() {
        let counters = Counters::new();
        counters.record_lock();
        counters.record_lock();
        counters.record_attempt();
        counters.record_attempt();
        counters.record_failure();
        counters.record_success();

        let stats = counters.snapshot();
        assert_eq!(stats.lock_acquisitions, 2);
        assert_eq!(stats.construction_attempts, 2);
        assert_eq!(stats.construction_failures, 1);
        assert_eq!(stats.construction_successes, 1);
        assert_eq!(stats.successful_constructions(), 1);
        assert_eq!(stats.to_string(), "locks=2 attempts=2 failures=1 successes=1");
    }

    #[test]
    fn attempt_in_progress_is_not_a_success() {
        let counters = Counters::new();
        counters.record_lock();
        counters.record_attempt();

        let stats = counters.snapshot();
        assert_eq!(stats.construction_attempts, 1);
        assert_eq!(stats.construction_failures, 0);
        assert_eq!(stats.successful_constructions(), 0);
    }

    #[test]
    fn fresh_counters_are_zero() {
        assert_eq!(Counters::new().snapshot(), SingletonStats::default());
    }
}
