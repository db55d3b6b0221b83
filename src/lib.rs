//! # qeva: Structured-Authoring Core
//!
//! Three pure pipelines behind one crate:
//!
//! 1. **QGL → TGIR**: a line-oriented goal language compiled into a typed
//!    directed graph ([`qgl::compile`]).
//! 2. **TGIR → score**: structural and semantic health of that graph
//!    ([`score::score`]).
//! 3. **Deliverable → verdict**: shape validation against a closed contract,
//!    then cross-field business rules ([`artifact::validate_artifact`]).
//!
//! ## Design Principles
//!
//! 1. **Pure core**: compile, score and validate never do I/O and never
//!    mutate their input
//! 2. **Clean DTOs**: `Graph`, `Node`, `Edge`, `Value` cross all boundaries
//! 3. **Full enumeration**: shape and rule failures are returned as complete,
//!    ordered lists, never the first one only
//! 4. **Injected state**: the event ledger and telemetry buffer are owned by
//!    the caller, never process-wide singletons
//!
//! ## Quick Start
//!
//! ```rust
//! use qeva::{qgl, score};
//!
//! # fn example() -> qeva::Result<()> {
//! let graph = qgl::compile("goal g1 \"Ship MVP\"\nedge g1 -> g1 : refines")?;
//! let report = score::score(&graph);
//! assert_eq!(report.components.structure_completeness, 1.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod qgl;
pub mod score;
pub mod artifact;
pub mod ledger;
pub mod telemetry;
pub mod config;
pub mod api;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Graph, Node, NodeType, Edge, EdgeType, Value, PropertyMap, TGIR_SCHEMA,
};

// ============================================================================
// Re-exports: Pipelines
// ============================================================================

pub use qgl::{compile, compile_with, CompileOptions};
pub use score::{score, score_with, ScoreReport, ScoreComponents, ScoreWeights};
pub use artifact::{
    validate_artifact, validate_artifact_with, validate_shape, validate_rules,
    Artifact, DocumentKind, ShapeReport, ShapeViolation, Validation, ValidateOptions,
};

// ============================================================================
// Re-exports: Collaborators
// ============================================================================

pub use ledger::{EventStore, Ledger, LedgerEvent, ListOptions, MemoryEventStore, StoredEvent};
pub use telemetry::{TelemetryBuffer, TelemetryEvent};
pub use config::Config;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("QGL syntax error on line {line_no}: {message}")]
    Parse { line_no: usize, line: String, message: String },

    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Rule evaluation error: {0}")]
    Evaluation(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
