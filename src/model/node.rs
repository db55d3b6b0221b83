//! Node in the TGIR graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};

/// The eight node kinds a QGL program can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Goal,
    Task,
    Data,
    Transform,
    Metric,
    Deliverable,
    Constraint,
    Test,
}

impl NodeType {
    pub const ALL: [NodeType; 8] = [
        NodeType::Goal,
        NodeType::Task,
        NodeType::Data,
        NodeType::Transform,
        NodeType::Metric,
        NodeType::Deliverable,
        NodeType::Constraint,
        NodeType::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Goal => "Goal",
            NodeType::Task => "Task",
            NodeType::Data => "Data",
            NodeType::Transform => "Transform",
            NodeType::Metric => "Metric",
            NodeType::Deliverable => "Deliverable",
            NodeType::Constraint => "Constraint",
            NodeType::Test => "Test",
        }
    }

    /// The QGL statement keyword that declares this node type.
    pub fn keyword(&self) -> &'static str {
        match self {
            NodeType::Goal => "goal",
            NodeType::Task => "task",
            NodeType::Data => "data",
            NodeType::Transform => "transform",
            NodeType::Metric => "metric",
            NodeType::Deliverable => "deliverable",
            NodeType::Constraint => "constraint",
            NodeType::Test => "test",
        }
    }

    /// Map a lowercase QGL keyword (`goal`, `task`, ...) to its node type.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == keyword)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown node type: {s}"))
    }
}

/// A node in the TGIR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is(&self, node_type: NodeType) -> bool {
        self.node_type == node_type
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
