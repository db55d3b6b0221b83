//! Typed edge in the TGIR graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Relationship kinds between TGIR nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Refines,
    Requires,
    Produces,
    Evaluates,
    Contradicts,
    Cites,
    OwnedBy,
    TypedAs,
}

impl EdgeType {
    pub const ALL: [EdgeType; 8] = [
        EdgeType::Refines,
        EdgeType::Requires,
        EdgeType::Produces,
        EdgeType::Evaluates,
        EdgeType::Contradicts,
        EdgeType::Cites,
        EdgeType::OwnedBy,
        EdgeType::TypedAs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Refines => "refines",
            EdgeType::Requires => "requires",
            EdgeType::Produces => "produces",
            EdgeType::Evaluates => "evaluates",
            EdgeType::Contradicts => "contradicts",
            EdgeType::Cites => "cites",
            EdgeType::OwnedBy => "owned_by",
            EdgeType::TypedAs => "typed_as",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown edge type: {s}"))
    }
}

/// A directed edge. Endpoints are node ids and may not resolve (dangling).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, edge_type: EdgeType) -> Self {
        Self { from: from.into(), to: to.into(), edge_type }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
