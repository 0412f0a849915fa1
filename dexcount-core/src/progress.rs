//! Progress notifications for a count.
//!
//! Methods are called from the counting worker threads, possibly
//! concurrently and in any order, so implementations must do their own
//! synchronization.

use crate::dependency::Dependency;
use crate::error::DexcountError;
use crate::tree::{CountNode, CountTree};

/// How far the counting phase has come when a node finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Nodes finished so far, this one included
    pub completed: usize,
    /// Unique dependencies in the closure
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Observer of the resolve/count lifecycle. All methods default to no-ops.
pub trait ProgressObserver: Send + Sync {
    /// Resolution of the transitive closure has started.
    fn on_start_resolve(&self, _dependency: &Dependency) {}

    /// The closure is known; counts are still zero.
    fn on_resolved(&self, _tree: &CountTree) {}

    /// A unique dependency finished counting, successfully or not.
    fn on_node_counted(&self, _node: &CountNode, _progress: Progress) {}

    /// Every node was counted successfully.
    fn on_done(&self, _tree: &CountTree) {}

    /// The count failed. Called after all outstanding work has joined.
    fn on_error(&self, _error: &DexcountError) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let p = Progress { completed: 1, total: 4 };
        assert!((p.fraction() - 0.25).abs() < f64::EPSILON);
        let empty = Progress { completed: 0, total: 0 };
        assert!((empty.fraction() - 1.0).abs() < f64::EPSILON);
    }
}
