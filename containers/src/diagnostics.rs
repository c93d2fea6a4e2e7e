use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Default number of emissions for a repeated compatibility warning.
pub const DEFAULT_WARNING_LIMIT: usize = 6;

/// A warning that is logged at most `limit` times by its owner.
///
/// The counter is atomic so a codec can be shared behind `&` between
/// independent chains without locking.
#[derive(Debug)]
pub struct RateLimitedWarning {
    message: &'static str,
    limit: usize,
    emitted: AtomicUsize,
}

impl RateLimitedWarning {
    pub const fn new(message: &'static str, limit: usize) -> Self {
        Self {
            message,
            limit,
            emitted: AtomicUsize::new(0),
        }
    }

    /// Log the warning unless the limit was reached. Returns whether it was logged.
    pub fn emit(&self, context: &str) -> bool {
        let previous = self.emitted.fetch_add(1, Ordering::Relaxed);
        if previous >= self.limit {
            return false;
        }
        warn!(%context, occurrence = previous + 1, limit = self.limit, "{}", self.message);
        true
    }

    /// How many times the condition was hit, logged or not.
    pub fn occurrences(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_logging_after_limit() {
        let warning = RateLimitedWarning::new("legacy default used", 2);
        assert!(warning.emit("a"));
        assert!(warning.emit("b"));
        assert!(!warning.emit("c"));
        assert!(!warning.emit("d"));
        assert_eq!(warning.occurrences(), 4);
    }
}
