//! Count tree: one canonical record per dependency, many tree positions.
//!
//! A resolved dependency closure is a tree, but the same library routinely
//! shows up under several parents (diamond dependencies). The tree keeps two
//! layers:
//!
//! - an arena of [`CountNode`] records, exactly one per [`Dependency`],
//! - a `petgraph` graph of *positions* whose weights are [`NodeId`]s into the
//!   arena.
//!
//! Every position for a given dependency references the same record, so
//! counts written once are seen from every place the dependency appears,
//! while the parent/child shape survives for display.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use crate::dependency::Dependency;
use crate::totals::{calculate_total, OwnCounts, TotalCounts};

/// Index of a canonical record in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A place in the tree. Several positions may share one [`NodeId`].
pub type Position = NodeIndex;

/// The resolution and counting result for a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountNode {
    pub dependency: Dependency,
    /// Resolver supplied artifact path; empty when nothing is countable
    pub location: String,
    pub own_methods: u64,
    pub own_fields: u64,
    /// Set when counting this dependency failed; counts stay zero
    pub failed: bool,
}

impl CountNode {
    pub fn new(dependency: Dependency, location: impl Into<String>) -> Self {
        Self {
            dependency,
            location: location.into(),
            own_methods: 0,
            own_fields: 0,
            failed: false,
        }
    }

    pub fn own_counts(&self) -> OwnCounts {
        OwnCounts {
            methods: self.own_methods,
            fields: self.own_fields,
        }
    }

    pub fn set_counts(&mut self, counts: OwnCounts) {
        self.own_methods = counts.methods;
        self.own_fields = counts.fields;
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}

/// A dependency tree with identity-shared count records.
#[derive(Debug, Clone)]
pub struct CountTree {
    nodes: Vec<CountNode>,
    index: HashMap<Dependency, NodeId>,
    positions: DiGraph<NodeId, ()>,
    root: Position,
}

impl CountTree {
    /// Create a tree holding only the root dependency.
    pub fn new(root: Dependency, location: impl Into<String>) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            positions: DiGraph::new(),
            root: NodeIndex::new(0),
        };
        let id = tree.intern(root, location.into());
        tree.root = tree.positions.add_node(id);
        tree
    }

    /// Attach a dependent under `parent` and return its new position.
    ///
    /// If the dependency already has a record, the new position shares it
    /// and `location` is ignored: the first location seen for an identity
    /// wins.
    ///
    /// # Panics
    /// Panics if `parent` is not a position of this tree.
    pub fn add_child(
        &mut self,
        parent: Position,
        dependency: Dependency,
        location: impl Into<String>,
    ) -> Position {
        let id = self.intern(dependency, location.into());
        let position = self.positions.add_node(id);
        self.positions.add_edge(parent, position, ());
        position
    }

    fn intern(&mut self, dependency: Dependency, location: String) -> NodeId {
        if let Some(&id) = self.index.get(&dependency) {
            if self.nodes[id.0].location != location {
                debug!(
                    dependency = %dependency,
                    kept = %self.nodes[id.0].location,
                    ignored = %location,
                    "repeated dependency with a different location"
                );
            }
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.index.insert(dependency.clone(), id);
        self.nodes.push(CountNode::new(dependency, location));
        id
    }

    pub fn root(&self) -> Position {
        self.root
    }

    pub fn root_node(&self) -> &CountNode {
        self.node_at(self.root)
    }

    pub fn node(&self, id: NodeId) -> &CountNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CountNode {
        &mut self.nodes[id.0]
    }

    /// The record a position refers to.
    pub fn node_at(&self, position: Position) -> &CountNode {
        &self.nodes[self.positions[position].0]
    }

    pub fn id_at(&self, position: Position) -> NodeId {
        self.positions[position]
    }

    pub fn id_of(&self, dependency: &Dependency) -> Option<NodeId> {
        self.index.get(dependency).copied()
    }

    pub fn get(&self, dependency: &Dependency) -> Option<&CountNode> {
        self.id_of(dependency).map(|id| self.node(id))
    }

    /// Children of a position, in the order they were added.
    pub fn children(&self, position: Position) -> Vec<Position> {
        // petgraph walks edges newest-first
        let mut children: Vec<Position> = self
            .positions
            .neighbors_directed(position, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    /// Every position in depth-first pre-order, paired with its depth.
    pub fn positions(&self) -> Vec<(Position, usize)> {
        let mut out = Vec::with_capacity(self.positions.node_count());
        let mut stack = vec![(self.root, 0)];
        while let Some((position, depth)) = stack.pop() {
            out.push((position, depth));
            for child in self.children(position).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Records directly under the root, in insertion order.
    pub fn direct_dependents(&self) -> Vec<&CountNode> {
        self.children(self.root)
            .into_iter()
            .map(|p| self.node_at(p))
            .collect()
    }

    /// Number of distinct dependencies in the tree, root included.
    pub fn unique_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of positions, counting every repetition.
    pub fn position_count(&self) -> usize {
        self.positions.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CountNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Arena records, indexed by [`NodeId::index`].
    pub(crate) fn nodes_mut(&mut self) -> &mut [CountNode] {
        &mut self.nodes
    }

    pub(crate) fn position_graph(&self) -> &DiGraph<NodeId, ()> {
        &self.positions
    }

    /// Aggregate counts over the deduplicated closure.
    pub fn total(&self) -> TotalCounts {
        calculate_total(self)
    }
}
