//! # QGL Language
//!
//! Line-oriented goal language compiled into a TGIR [`Graph`].
//! Pure functions: no I/O, no state.
//!
//! ```text
//! // comments and blank lines are skipped
//! goal g1 "Ship MVP" {priority: 1, owners: ["ada", "lin"]}
//! metric m1 latency := p95(response_ms)
//! edge m1 -> g1 : evaluates
//! ```

pub mod statement;
pub mod props;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Graph;
use crate::{Error, Result};
use statement::Statement;

/// Compiler switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Accept programs that declare the same node id more than once.
    pub allow_duplicate_ids: bool,
}

/// Compile QGL source text into a TGIR graph with default options.
pub fn compile(source: &str) -> Result<Graph> {
    compile_with(source, &CompileOptions::default())
}

/// Compile QGL source text into a TGIR graph.
///
/// Nodes and edges keep source order. The first bad line aborts
/// compilation with [`Error::Parse`].
pub fn compile_with(source: &str, options: &CompileOptions) -> Result<Graph> {
    let mut graph = Graph::compiled();
    let mut declared: HashSet<String> = HashSet::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let parse_error = |message: String| Error::Parse {
            line_no: idx + 1,
            line: line.to_owned(),
            message,
        };

        match statement::parse_line(line).map_err(parse_error)? {
            Statement::Edge(edge) => graph.edges.push(edge),
            Statement::Node(node) => {
                if !declared.insert(node.id.clone()) && !options.allow_duplicate_ids {
                    return Err(parse_error(format!("duplicate node id: {}", node.id)));
                }
                graph.nodes.push(node);
            }
        }
    }

    debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "compiled QGL program");
    Ok(graph)
}
