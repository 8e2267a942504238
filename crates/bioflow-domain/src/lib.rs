//! Bioflow Domain Layer
//!
//! Value types shared by the composition engine, the registry search
//! pipeline and the tool server.
//!
//! ## Key Concepts
//!
//! - **Template**: field name → specification string describing a workflow's inputs
//! - **Field Class**: required, optional with a default, or optional without one
//! - **Sample**: one set of workflow input values supplied by the caller
//! - **Search Condition**: a `(field, operator, term)` triple compiled into a backend clause
//! - **Search Hit**: one registry document with its backend relevance score
//! - **Ranked Hit**: an `(index, score)` pair selected by the reranker or its fallback
//!
//! Nothing in here performs I/O; the crates that talk to files, processes
//! and HTTP services build on these types.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod ranking;
pub mod sample;
pub mod search;
pub mod template;

// Re-exports for convenience
pub use field::{Classification, FieldClass};
pub use ranking::RankedHit;
pub use sample::{FieldError, ParamsShapeError, Sample, SampleParams};
pub use search::{
    BooleanOperator, HitList, QueryType, SearchCondition, SearchHit, SearchResponse, UNNAMED_WORKFLOW,
};
pub use template::Template;
