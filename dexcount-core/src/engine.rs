//! Counting orchestrator: resolve, deduplicate, count in parallel, join.
//!
//! Performance characteristics:
//! - Resolution: one blocking resolver call
//! - Counting: one rayon task per unique dependency on a dedicated pool of
//!   `min(unique, max_jobs)` threads; diamond dependencies are counted once
//! - Shared state: an atomic completion counter, an atomic failure counter
//!   and a mutex-guarded first-error slot. Count writes go to disjoint
//!   `&mut` arena records and take no lock.
//!
//! A failed node never stops its siblings. Every dispatched node runs to
//! completion before `count` returns, and whatever was counted stays on the
//! tree next to the error.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::counter::{Artifact, Counter};
use crate::dependency::Dependency;
use crate::error::{DexcountError, DexcountResult};
use crate::flatten::flatten;
use crate::progress::{Progress, ProgressObserver};
use crate::resolver::Resolver;
use crate::totals::{OwnCounts, TotalCounts};
use crate::tree::{CountNode, CountTree};

/// The fully joined result of a count.
#[derive(Debug)]
pub struct CountOutcome {
    /// Resolved tree; every node that counted successfully carries its counts
    pub tree: CountTree,
    /// First node failure recorded, if any
    pub error: Option<DexcountError>,
    /// Number of unique dependencies that failed to count
    pub failed: usize,
}

impl CountOutcome {
    /// True when every unique dependency was counted.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn total(&self) -> TotalCounts {
        self.tree.total()
    }

    /// Drops the partial tree on failure.
    pub fn into_result(self) -> DexcountResult<CountTree> {
        match self.error {
            None => Ok(self.tree),
            Some(err) => Err(err),
        }
    }
}

/// Composes a [`Resolver`] (structure) and a [`Counter`] (leaf counts).
#[derive(Debug, Clone)]
pub struct Engine<R, C> {
    resolver: R,
    counter: C,
    max_jobs: Option<usize>,
}

impl<R: Resolver, C: Counter> Engine<R, C> {
    pub fn new(resolver: R, counter: C) -> Self {
        Self {
            resolver,
            counter,
            max_jobs: None,
        }
    }

    /// Caps the number of concurrent counting jobs (at least one).
    pub fn with_max_jobs(mut self, jobs: usize) -> Self {
        self.max_jobs = Some(jobs.max(1));
        self
    }

    #[cfg(test)]
    pub(crate) fn counter(&self) -> &C {
        &self.counter
    }

    /// Resolves `dependency` and counts every unique node of its tree.
    ///
    /// Returns `Err` only when resolution fails. Node failures are reported
    /// through [`CountOutcome::error`] once all nodes have finished.
    pub fn count(
        &self,
        dependency: &Dependency,
        observer: &dyn ProgressObserver,
    ) -> DexcountResult<CountOutcome> {
        observer.on_start_resolve(dependency);
        let mut tree = match self.resolver.resolve(dependency) {
            Ok(tree) => tree,
            Err(err) => {
                observer.on_error(&err);
                return Err(err);
            }
        };
        observer.on_resolved(&tree);

        let unique: HashSet<usize> = flatten(&tree).values().map(|id| id.index()).collect();
        let total = unique.len();
        let jobs = self.max_jobs.map_or(total, |cap| cap.min(total)).max(1);
        info!(dependency = %dependency, unique = total, jobs, "counting dependencies");

        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let first_error: Mutex<Option<DexcountError>> = Mutex::new(None);

        let mut work = || {
            tree.nodes_mut()
                .par_iter_mut()
                .enumerate()
                .filter(|(index, _)| unique.contains(index))
                .for_each(|(_, node)| {
                    match self.count_node(node) {
                        Ok(counts) => {
                            node.set_counts(counts);
                            debug!(
                                dependency = %node.dependency,
                                methods = counts.methods,
                                fields = counts.fields,
                                "counted"
                            );
                        }
                        Err(err) => {
                            node.mark_failed();
                            failed.fetch_add(1, Ordering::Relaxed);
                            warn!(dependency = %node.dependency, error = %err, "count failed");
                            let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                        }
                    }

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    observer.on_node_counted(node, Progress { completed: done, total });
                });
        };

        match ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("dexcount-{}", i))
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(err) => {
                warn!(error = %err, "could not build counting pool; using the global pool");
                work();
            }
        }

        let error = first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let outcome = CountOutcome {
            tree,
            error,
            failed: failed.into_inner(),
        };

        match &outcome.error {
            None => {
                let totals = outcome.total();
                info!(
                    dependency = %dependency,
                    methods = totals.methods,
                    fields = totals.fields,
                    "count complete"
                );
                observer.on_done(&outcome.tree);
            }
            Some(err) => {
                warn!(dependency = %dependency, failed = outcome.failed, "count incomplete");
                observer.on_error(err);
            }
        }

        Ok(outcome)
    }

    /// Counts one record; never touches the tree.
    fn count_node(&self, node: &CountNode) -> DexcountResult<OwnCounts> {
        if node.location.is_empty() {
            return Err(DexcountError::counting(&node.dependency, "No Path"));
        }

        let artifact = Artifact::classify(&node.location).ok_or_else(|| {
            DexcountError::unsupported_format(&node.dependency, node.location.as_str())
        })?;

        self.counter
            .count_one(&node.dependency, &artifact)
            .map_err(|e| DexcountError::counting_caused_by(&node.dependency, e))
    }
}
