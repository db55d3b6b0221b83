//! JSON payload handlers.
//!
//! Each handler takes a request body and returns the reply body. Failures
//! never escape as `Err`; they become `{"ok": false, "error": ...}`.

use serde::Deserialize;
use serde_json::{json, Value as Json};
use tracing::debug;

use crate::artifact::validate_artifact_with;
use crate::config::Config;
use crate::model::Graph;
use crate::qgl::compile_with;
use crate::score::score_with;
use crate::{Error, Result};

pub const MISSING_SOURCE: &str = r#"Body must include non-empty "source" string"#;
pub const MISSING_TGIR: &str = r#"Body must include a "tgir" object"#;

/// `{source}` → `{ok: true, tgir}` | `{ok: false, error}`.
pub fn handle_compile(request: &Json, config: &Config) -> Json {
    let source = match request.get("source").and_then(Json::as_str) {
        Some(s) if !s.trim().is_empty() => s,
        _ => return failure(MISSING_SOURCE),
    };
    match compile_with(source, &config.compile) {
        Ok(tgir) => json!({ "ok": true, "tgir": tgir }),
        Err(e) => failure(e),
    }
}

/// `{tgir}` → `{ok: true, score, components, diffs}` | `{ok: false, error}`.
pub fn handle_score(request: &Json, config: &Config) -> Json {
    let graph = match decode_graph(request) {
        Ok(g) => g,
        Err(e) => return failure(e),
    };
    let report = score_with(&graph, &config.scoring);
    json!({
        "ok": true,
        "score": report.score,
        "components": report.components,
        "diffs": report.diffs,
    })
}

/// Document → `{ok, errors}` (plus `evaluationError` when the rule pass
/// could not run).
pub fn handle_validate(request: &Json, config: &Config) -> Json {
    let verdict = validate_artifact_with(request, &config.validation);
    match serde_json::to_value(&verdict) {
        Ok(reply) => reply,
        Err(e) => failure(Error::from(e)),
    }
}

fn decode_graph(request: &Json) -> Result<Graph> {
    if !request.is_object() {
        return Err(Error::InvalidPayload("request body must be a JSON object".into()));
    }
    let tgir = request
        .get("tgir")
        .filter(|t| t.is_object())
        .ok_or_else(|| Error::InvalidGraph(MISSING_TGIR.into()))?;
    let graph = Graph::deserialize(tgir).map_err(|e| Error::InvalidGraph(e.to_string()))?;
    debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "decoded graph");
    Ok(graph)
}

fn failure(error: impl ToString) -> Json {
    json!({ "ok": false, "error": error.to_string() })
}
