//! Aggregation of method/field counts over a deduplicated closure.

use std::iter::Sum;
use std::ops::Add;

use serde::Serialize;

use crate::flatten::flatten;
use crate::tree::CountTree;

/// Method and field counts contributed by a single artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OwnCounts {
    pub methods: u64,
    pub fields: u64,
}

/// Counts summed across every unique dependency of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TotalCounts {
    pub methods: u64,
    pub fields: u64,
}

impl Add<OwnCounts> for TotalCounts {
    type Output = TotalCounts;

    fn add(self, rhs: OwnCounts) -> TotalCounts {
        TotalCounts {
            methods: self.methods + rhs.methods,
            fields: self.fields + rhs.fields,
        }
    }
}

impl Sum<OwnCounts> for TotalCounts {
    fn sum<I: Iterator<Item = OwnCounts>>(iter: I) -> Self {
        iter.fold(TotalCounts::default(), |acc, c| acc + c)
    }
}

/// Sums own counts once per unique dependency.
///
/// A diamond dependency appearing under several parents contributes once.
pub fn calculate_total(tree: &CountTree) -> TotalCounts {
    flatten(tree)
        .values()
        .map(|&id| tree.node(id).own_counts())
        .sum()
}
