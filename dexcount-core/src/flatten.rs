//! Deduplication of a count tree into its set of unique dependencies.
//!
//! Performance characteristics:
//! - Single DFS over all positions: O(positions)
//! - Output ordered by dependency for deterministic iteration

use std::collections::BTreeMap;

use petgraph::visit::Dfs;

use crate::dependency::Dependency;
use crate::tree::{CountTree, NodeId};

/// Maps every distinct dependency reachable from the root to its record.
///
/// Each entry points at the one shared record, never a copy, so writing
/// counts through the returned ids is observed from every tree position
/// referencing that dependency.
pub fn flatten(tree: &CountTree) -> BTreeMap<&Dependency, NodeId> {
    let graph = tree.position_graph();
    let mut flattened = BTreeMap::new();

    let mut dfs = Dfs::new(graph, tree.root());
    while let Some(position) = dfs.next(graph) {
        let id = graph[position];
        flattened.entry(&tree.node(id).dependency).or_insert(id);
    }

    flattened
}
