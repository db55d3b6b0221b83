//! # Deliverable Validation
//!
//! Two passes over a deliverable document (SlideDeck, OnePager, Flashcards):
//!
//! ```text
//! document ──► schema::validate_shape ──► ShapeReport (closed contract)
//!          └─► rules::evaluate_rules  ──► rule errors (word budgets, citations)
//!                         │
//!                         └─► Validation { ok, errors }
//! ```
//!
//! Both passes always run, so one round-trip yields every problem.
//! Neither pass mutates the document.

pub mod document;
pub mod schema;
pub mod contracts;
pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, warn};

pub use document::{Artifact, Card, Flashcards, FigureStub, OnePager, Slide, SlideDeck, Source, SourceKind};
pub use rules::{evaluate_rules, validate_rules, word_count};
pub use schema::{validate_shape, ShapeReport, ShapeViolation};

/// The discriminant of a deliverable document (`kind` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    SlideDeck,
    OnePager,
    Flashcards,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [DocumentKind::SlideDeck, DocumentKind::OnePager, DocumentKind::Flashcards];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::SlideDeck => "SlideDeck",
            DocumentKind::OnePager => "OnePager",
            DocumentKind::Flashcards => "Flashcards",
        }
    }

    /// Read the `kind` discriminant of a raw document.
    pub fn detect(doc: &Json) -> Result<Self, KindError> {
        let kind = doc
            .as_object()
            .and_then(|o| o.get("kind"))
            .ok_or(KindError::NotAnObject)?;
        Self::ALL
            .into_iter()
            .find(|k| kind.as_str() == Some(k.as_str()))
            .ok_or_else(|| KindError::UnknownKind(match kind {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            }))
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a document could not be dispatched to a contract at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    #[error("artifact must be an object with a 'kind' field")]
    NotAnObject,

    #[error("unknown kind: {0}")]
    UnknownKind(String),
}

/// Validation switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidateOptions {
    /// Treat a rule pass that cannot be evaluated as "no rule errors"
    /// instead of reporting it.
    pub fail_open: bool,
}

/// Combined verdict of both passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub ok: bool,
    /// Shape violations first, then rule errors.
    pub errors: Vec<String>,
    /// Set when the rule pass could not run: a list field of the document
    /// is not a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_error: Option<String>,
}

impl Validation {
    fn rejected(reason: impl Into<String>) -> Self {
        Self { ok: false, errors: vec![reason.into()], evaluation_error: None }
    }
}

/// Validate a raw document with default options.
pub fn validate_artifact(doc: &Json) -> Validation {
    validate_artifact_with(doc, &ValidateOptions::default())
}

/// Validate a raw document: shape pass, then rule pass, merged.
///
/// `ok` holds only when the shape is valid, the rule list is empty and the
/// rule pass could be evaluated.
pub fn validate_artifact_with(doc: &Json, options: &ValidateOptions) -> Validation {
    let shape = match validate_shape(doc) {
        Ok(report) => report,
        Err(e) => return Validation::rejected(e.to_string()),
    };

    let (rule_errors, evaluation_error) = match evaluate_rules(doc) {
        Ok(errors) => (errors, None),
        Err(e) => {
            warn!(kind = %shape.kind, error = %e, fail_open = options.fail_open, "rule pass not evaluated");
            (Vec::new(), (!options.fail_open).then(|| e.to_string()))
        }
    };

    let shape_ok = shape.is_valid();
    let mut errors: Vec<String> = shape.violations.iter().map(ToString::to_string).collect();
    errors.extend(rule_errors);
    let ok = shape_ok && errors.is_empty() && evaluation_error.is_none();

    debug!(kind = %shape.kind, ok, errors = errors.len(), "validated artifact");
    Validation { ok, errors, evaluation_error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_kind() {
        assert_eq!(DocumentKind::detect(&json!({"kind": "OnePager"})), Ok(DocumentKind::OnePager));
        assert_eq!(DocumentKind::detect(&json!([1])), Err(KindError::NotAnObject));
        assert_eq!(DocumentKind::detect(&json!({"title": "x"})), Err(KindError::NotAnObject));
        assert_eq!(
            DocumentKind::detect(&json!({"kind": "Poster"})),
            Err(KindError::UnknownKind("Poster".into()))
        );
        assert_eq!(
            DocumentKind::detect(&json!({"kind": 5})).unwrap_err().to_string(),
            "unknown kind: 5"
        );
    }

    #[test]
    fn test_unknown_kind_is_hard_failure() {
        let v = validate_artifact(&json!({"kind": "Poster", "slides": []}));
        assert!(!v.ok);
        assert_eq!(v.errors, vec!["unknown kind: Poster"]);
    }

    #[test]
    fn test_evaluation_error_surfaced_unless_fail_open() {
        let doc = json!({"kind": "OnePager", "keyFacts": "none"});
        let strict = validate_artifact(&doc);
        assert!(!strict.ok);
        assert!(strict.evaluation_error.is_some());
        assert!(strict.errors.iter().all(|e| e.starts_with("required") || e.starts_with("type")));
        assert!(strict.errors.iter().any(|e| e.starts_with("type at /keyFacts")));

        let lenient = validate_artifact_with(&doc, &ValidateOptions { fail_open: true });
        assert!(!lenient.ok);
        assert!(lenient.evaluation_error.is_none());
        assert_eq!(lenient.errors, strict.errors);
    }

    #[test]
    fn test_shape_errors_keep_rule_errors() {
        let doc = json!({"kind": "OnePager", "problem": 5});
        let v = validate_artifact(&doc);
        assert!(!v.ok);
        assert!(v.evaluation_error.is_none());
        assert!(v.errors.iter().any(|e| e.starts_with("required at") || e.starts_with("required {")));
        assert!(v.errors.iter().any(|e| e == "must include at least one citation"));
        assert!(v.errors.iter().any(|e| e == "must include at least one source"));
    }
}
