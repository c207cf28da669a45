//! NLSQL Intermediate Representation (IR)
//!
//! Shared data model for the whole pipeline: scalar values and rows, the
//! in-memory dataset, and the typed statement produced by the SQL parser.
//! All types are deterministically serializable so statements can be
//! fingerprinted for logging.

mod dataset;
mod statement;
mod types;

pub use dataset::*;
pub use statement::*;
pub use types::*;
