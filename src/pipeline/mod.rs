//! The keyed pipelines and their run summaries.
//!
//! Every pipeline is generic over the archive traits, so the same code runs
//! against files, stdio, or in-memory archives. A pipeline returns `Err` only
//! for fatal conditions; everything else is counted in its summary.

mod concat;
mod copy;
mod similarity;
mod summary;

pub use concat::append_vectors;
pub use copy::copy_records;
pub use similarity::{SimilarityOptions, compute_dot_products_dense, dense_dot_products};
pub use summary::{ConcatSummary, CopySummary, RunSummary, SimilaritySummary, StreamSide};
