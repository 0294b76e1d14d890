// Note Graph - Directed graph of note activations keyed by (pitch, time)
// Backed by petgraph; a key index makes node lookups exact

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::types::{EdgeKind, GraphEdge, GraphNode, NodeKey};

/// Graph produced by the builders
///
/// Only the builders in this module mutate it; once returned it is read-only.
/// Every edge references nodes that exist in the node set.
#[derive(Debug, Clone, Default)]
pub struct NoteGraph {
    graph: DiGraph<GraphNode, EdgeKind>,
    index: HashMap<NodeKey, NodeIndex>,
}

impl NoteGraph {
    pub(crate) fn new() -> Self {
        NoteGraph::default()
    }

    /// Insert a node, or refresh the attributes of an existing one
    pub(crate) fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.key) {
            self.graph[idx] = node;
            return idx;
        }

        let key = node.key;
        let idx = self.graph.add_node(node);
        self.index.insert(key, idx);
        idx
    }

    /// Add (or retag) an edge. Returns false, leaving the graph unchanged,
    /// when either endpoint is missing.
    pub(crate) fn add_edge(&mut self, from: &NodeKey, to: &NodeKey, kind: EdgeKind) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => {
                self.graph.update_edge(a, b, kind);
                true
            }
            _ => false,
        }
    }

    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.index.get(key).map(|&idx| &self.graph[idx])
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = GraphEdge> + '_ {
        self.graph.edge_references().map(move |edge| GraphEdge {
            from: self.graph[edge.source()].key,
            to: self.graph[edge.target()].key,
            kind: *edge.weight(),
        })
    }

    /// Kind of the edge `from -> to`, if there is one
    pub fn edge_kind(&self, from: &NodeKey, to: &NodeKey) -> Option<EdgeKind> {
        let a = *self.index.get(from)?;
        let b = *self.index.get(to)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Targets of the outgoing edges of `key` with the given kind
    pub fn successors(&self, key: &NodeKey, kind: EdgeKind) -> Vec<NodeKey> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };

        let mut targets: Vec<NodeKey> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| self.graph[edge.target()].key)
            .collect();
        targets.sort();
        targets
    }

    /// Number of distinct nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges of either kind
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges of one kind
    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.graph.edge_weights().filter(|&&k| k == kind).count()
    }

    /// True when the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Underlying petgraph graph, for callers running graph algorithms
    pub fn as_petgraph(&self) -> &DiGraph<GraphNode, EdgeKind> {
        &self.graph
    }
}
