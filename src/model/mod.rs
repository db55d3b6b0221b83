//! # TGIR Graph Model
//!
//! Typed DTOs for the directed goal graph (TGIR) that the QGL compiler
//! produces and the scorer consumes.
//!
//! Design rule: this module is pure data. No parsing, no scoring, no I/O.

pub mod node;
pub mod edge;
pub mod graph;
pub mod value;

pub use node::{Node, NodeType};
pub use edge::{Edge, EdgeType};
pub use graph::{Graph, TGIR_SCHEMA};
pub use value::{PropertyMap, Value};
