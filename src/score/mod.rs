//! # TGIR Alignment Scorer
//!
//! Computes a composite 0–100 health score for a compiled graph plus
//! remediation hints. Pure function of the graph; no I/O, no state.
//!
//! | Component | Rule |
//! |-----------|------|
//! | `structureCompleteness` | 1 − dangling/total edges (1 with no edges) |
//! | `evidence` | 1 unless a Deliverable exists and no `cites` edge does |
//! | `constraintPass` | share of Constraint nodes with `required: false` |
//! | `testPass` | share of Test nodes with `pass: true` |
//! | `goalMatch`, `humanity` | fixed placeholders |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{EdgeType, Graph, Node, NodeType, Value};

/// Placeholder until a goal-matching model exists. Not derived from content.
pub const GOAL_MATCH_PLACEHOLDER: f64 = 0.7;
/// Placeholder until a humanity model exists. Not derived from content.
pub const HUMANITY_PLACEHOLDER: f64 = 0.8;

pub const DIFF_DANGLING: &str = "Fix dangling edges or missing nodes.";
pub const DIFF_MISSING_CITATION: &str = "Add at least one citation (cites edge) for deliverables.";
pub const DIFF_UNMET_CONSTRAINTS: &str = "Some constraints marked required are unmet.";
pub const DIFF_FAILING_TESTS: &str = "Some tests are failing or unspecified.";

/// Per-component weights of the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreWeights {
    pub goal_match: f64,
    pub constraint_pass: f64,
    pub test_pass: f64,
    pub structure_completeness: f64,
    pub evidence: f64,
    pub humanity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            goal_match: 1.0,
            constraint_pass: 1.0,
            test_pass: 1.0,
            structure_completeness: 1.0,
            evidence: 1.0,
            humanity: 1.0,
        }
    }
}

impl ScoreWeights {
    /// Build from six values in component order
    /// (goalMatch, constraintPass, testPass, structureCompleteness, evidence, humanity).
    pub fn from_array(w: [f64; 6]) -> Self {
        Self {
            goal_match: w[0],
            constraint_pass: w[1],
            test_pass: w[2],
            structure_completeness: w[3],
            evidence: w[4],
            humanity: w[5],
        }
    }

    pub fn total(&self) -> f64 {
        self.goal_match
            + self.constraint_pass
            + self.test_pass
            + self.structure_completeness
            + self.evidence
            + self.humanity
    }
}

/// The six score components, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub goal_match: f64,
    pub constraint_pass: f64,
    pub test_pass: f64,
    pub structure_completeness: f64,
    pub evidence: f64,
    pub humanity: f64,
}

impl ScoreComponents {
    fn weighted_mean(&self, w: &ScoreWeights) -> f64 {
        let total = w.total();
        if total <= 0.0 {
            return 0.0;
        }
        (w.goal_match * self.goal_match
            + w.constraint_pass * self.constraint_pass
            + w.test_pass * self.test_pass
            + w.structure_completeness * self.structure_completeness
            + w.evidence * self.evidence
            + w.humanity * self.humanity)
            / total
    }
}

/// Score plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Aggregate, 0–100.
    pub score: u8,
    pub components: ScoreComponents,
    /// Remediation hints, one per detected problem.
    pub diffs: Vec<String>,
}

/// Score a graph with equal weights.
pub fn score(graph: &Graph) -> ScoreReport {
    score_with(graph, &ScoreWeights::default())
}

/// Score a graph with explicit component weights.
pub fn score_with(graph: &Graph, weights: &ScoreWeights) -> ScoreReport {
    let dangling = graph.dangling_edges().len();
    let structure_completeness = if graph.edges.is_empty() {
        1.0
    } else {
        1.0 - dangling as f64 / graph.edges.len() as f64
    };

    let has_deliverable = graph.nodes_of(NodeType::Deliverable).next().is_some();
    let has_citation = graph.edges_of(EdgeType::Cites).next().is_some();
    let evidence = if !has_deliverable || has_citation { 1.0 } else { 0.0 };

    // A constraint "passes" when it explicitly opts out with `required: false`.
    let constraints: Vec<&Node> = graph.nodes_of(NodeType::Constraint).collect();
    let constraint_pass = pass_ratio(&constraints, "required", false);

    let tests: Vec<&Node> = graph.nodes_of(NodeType::Test).collect();
    let test_pass = pass_ratio(&tests, "pass", true);

    let components = ScoreComponents {
        goal_match: GOAL_MATCH_PLACEHOLDER,
        constraint_pass,
        test_pass,
        structure_completeness,
        evidence,
        humanity: HUMANITY_PLACEHOLDER,
    };

    let mut diffs = Vec::new();
    if structure_completeness < 1.0 {
        diffs.push(DIFF_DANGLING.to_owned());
    }
    if has_deliverable && !has_citation {
        diffs.push(DIFF_MISSING_CITATION.to_owned());
    }
    if !constraints.is_empty() && constraint_pass < 1.0 {
        diffs.push(DIFF_UNMET_CONSTRAINTS.to_owned());
    }
    if !tests.is_empty() && test_pass < 1.0 {
        diffs.push(DIFF_FAILING_TESTS.to_owned());
    }

    let score = (components.weighted_mean(weights) * 100.0).round().clamp(0.0, 100.0) as u8;
    debug!(score, dangling, diffs = diffs.len(), "scored TGIR graph");

    ScoreReport { score, components, diffs }
}

/// Fraction of `nodes` whose boolean property `key` is exactly `expected`.
/// An empty set scores 1.
fn pass_ratio(nodes: &[&Node], key: &str, expected: bool) -> f64 {
    if nodes.is_empty() {
        return 1.0;
    }
    let passing = nodes
        .iter()
        .filter(|n| n.get(key).and_then(Value::as_bool) == Some(expected))
        .count();
    passing as f64 / nodes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_graph() {
        let report = score(&Graph::new());
        assert_eq!(report.components.structure_completeness, 1.0);
        assert_eq!(report.components.evidence, 1.0);
        assert_eq!(report.components.constraint_pass, 1.0);
        assert_eq!(report.components.test_pass, 1.0);
        // (0.7 + 1 + 1 + 1 + 1 + 0.8) / 6 = 0.9166..
        assert_eq!(report.score, 92);
        assert!(report.diffs.is_empty());
    }

    #[test]
    fn test_dangling_edge_penalty() {
        let g = Graph::new()
            .with_node(Node::new("a", NodeType::Task, "a"))
            .with_edge(Edge::new("a", "a", EdgeType::Refines))
            .with_edge(Edge::new("a", "ghost", EdgeType::Requires));
        let report = score(&g);
        assert_eq!(report.components.structure_completeness, 0.5);
        assert_eq!(report.diffs, vec![DIFF_DANGLING.to_string()]);
    }

    #[test]
    fn test_deliverable_needs_citation() {
        let g = Graph::new().with_node(Node::new("d", NodeType::Deliverable, "report"));
        let report = score(&g);
        assert_eq!(report.components.evidence, 0.0);
        assert_eq!(report.diffs, vec![DIFF_MISSING_CITATION.to_string()]);

        let cited = g.with_node(Node::new("s", NodeType::Data, "paper"))
            .with_edge(Edge::new("d", "s", EdgeType::Cites));
        assert_eq!(score(&cited).components.evidence, 1.0);
    }

    #[test]
    fn test_constraint_opt_out_counts_as_pass() {
        let g = Graph::new()
            .with_node(Node::new("c1", NodeType::Constraint, "a").with_property("required", false))
            .with_node(Node::new("c2", NodeType::Constraint, "b").with_property("required", true))
            .with_node(Node::new("c3", NodeType::Constraint, "c"))
            .with_node(Node::new("c4", NodeType::Constraint, "d").with_property("required", "false"));
        let report = score(&g);
        assert_eq!(report.components.constraint_pass, 0.25);
        assert_eq!(report.diffs, vec![DIFF_UNMET_CONSTRAINTS.to_string()]);
    }

    #[test]
    fn test_tests_must_pass_explicitly() {
        let g = Graph::new()
            .with_node(Node::new("t1", NodeType::Test, "a").with_property("pass", true))
            .with_node(Node::new("t2", NodeType::Test, "b"));
        let report = score(&g);
        assert_eq!(report.components.test_pass, 0.5);
        assert_eq!(report.diffs, vec![DIFF_FAILING_TESTS.to_string()]);
    }

    #[test]
    fn test_diffs_co_occur_in_order() {
        let g = Graph::new()
            .with_node(Node::new("d", NodeType::Deliverable, "x"))
            .with_node(Node::new("c", NodeType::Constraint, "y"))
            .with_node(Node::new("t", NodeType::Test, "z").with_property("pass", false))
            .with_edge(Edge::new("d", "nowhere", EdgeType::Produces));
        let report = score(&g);
        assert_eq!(
            report.diffs,
            vec![
                DIFF_DANGLING.to_string(),
                DIFF_MISSING_CITATION.to_string(),
                DIFF_UNMET_CONSTRAINTS.to_string(),
                DIFF_FAILING_TESTS.to_string(),
            ]
        );
        // (0.7 + 0 + 0 + 0 + 0 + 0.8) / 6 = 0.25
        assert_eq!(report.score, 25);
    }

    #[test]
    fn test_custom_weights() {
        let only_structure = ScoreWeights::from_array([0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(score_with(&Graph::new(), &only_structure).score, 100);

        let zero = ScoreWeights::from_array([0.0; 6]);
        assert_eq!(score_with(&Graph::new(), &zero).score, 0);
    }

    #[test]
    fn test_components_serialize_camel_case() {
        let json = serde_json::to_value(score(&Graph::new())).unwrap();
        assert_eq!(json["components"]["structureCompleteness"], 1.0);
        assert_eq!(json["components"]["goalMatch"], 0.7);
    }
}
