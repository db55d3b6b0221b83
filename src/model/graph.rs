//! The TGIR graph: ordered nodes plus ordered typed edges.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::{Edge, EdgeType, Node, NodeType};

/// Provenance identifier stamped on every compiled graph.
pub const TGIR_SCHEMA: &str = "https://qeva.org/tgir/v0/schema.json";

/// A compiled TGIR graph.
///
/// Node and edge order is the order of the source statements. Edges hold
/// ids, not nodes, so an edge may dangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph stamped with [`TGIR_SCHEMA`].
    pub fn compiled() -> Self {
        Self { schema: Some(TGIR_SCHEMA.to_owned()), ..Self::default() }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn nodes_of(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.is(node_type))
    }

    pub fn edges_of(&self, edge_type: EdgeType) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    /// Edges whose `from` or `to` does not name a node in this graph.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        let ids = self.node_ids();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.from.as_str()) || !ids.contains(e.to.as_str()))
            .collect()
    }

    /// Ids declared more than once, in order of their second occurrence.
    pub fn duplicate_node_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) && !dups.contains(&node.id.as_str()) {
                dups.push(node.id.as_str());
            }
        }
        dups
    }
}
