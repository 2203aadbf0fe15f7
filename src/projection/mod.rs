//! Schema-driven projection engine.
//!
//! # Data Flow
//! ```text
//! SourceNode (untyped upstream tree)
//!     → rule.rs (ObjectShape: ordered rules, presence checks)
//!         → convert.rs (leaf converters: text, timestamp)
//!         → project_list (collections, nested collections)
//!     → OutputDocument (ordered, serializable)
//! ```
//!
//! # Design Decisions
//! - Shapes are immutable values built once and shared via `Arc`
//! - Absent fields are omitted, except always-present collections which
//!   become `[]`
//! - Any present value of the wrong shape fails the whole projection
//! - Pure and synchronous: no I/O, no shared mutable state

pub mod convert;
pub mod error;
pub mod node;
pub mod output;
pub mod rule;

pub use convert::Converter;
pub use error::{ProjectionError, ProjectionErrorKind, ProjectionResult};
pub use node::SourceNode;
pub use output::{OutputDocument, OutputValue};
pub use rule::{project_list, ObjectShape, Presence, Projector, Rule};
