//! Per-session query counters.

use serde::Serialize;

/// Cumulative query counters for one `Database`.
///
/// Every query attempt increments `total` and exactly one of `succeeded` or
/// `failed`, so `total == succeeded + failed` always holds. Counters only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl QueryStats {
    pub(crate) fn record_success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}
