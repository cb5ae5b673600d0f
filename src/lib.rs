//! Keyed vector archives and the pipelines that join them.
//!
//! Archives are ordered `(key, value)` collections read and written through
//! the traits in [`archive`]. The [`pipeline`] module holds the two joins
//! built on them: lockstep concatenation of two vector streams, and dense
//! per-group dot-product matrices over a random-access vector store.

pub mod archive;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod vector;

// Explicit exports for better API clarity
pub use archive::{
    ArchiveWriter, KeyedLookup, KeyedSink, KeyedStream, Locator, MemoryArchive, MemoryWriter,
    RandomAccessReader, SequentialReader, TokenList, WriterOptions,
};
pub use config::Settings;
pub use error::{ArchiveError, ArchiveResult, PipelineError, PipelineResult};
pub use pipeline::{
    ConcatSummary, RunSummary, SimilarityOptions, SimilaritySummary, append_vectors,
    compute_dot_products_dense, copy_records,
};
pub use vector::{Matrix, Vector};
