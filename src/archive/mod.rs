//! Keyed archive access.
//!
//! An archive is an ordered collection of `(key, value)` records. Pipelines
//! consume archives only through three traits:
//!
//! - [`KeyedStream`]: forward-only cursor over records
//! - [`KeyedLookup`]: point lookups by key, in any order
//! - [`KeyedSink`]: sequential writes
//!
//! File-backed implementations are opened from locator strings (see
//! [`Locator`]); [`MemoryArchive`] and [`MemoryWriter`] cover in-memory use.
//!
//! # Formats
//!
//! Text archives hold one record per line (`key [ 1 2 3 ]` for vectors,
//! `key a b c` for token lists; matrices span lines up to the closing `]`).
//! Binary archives start with a 16-byte header and store every value
//! bit-exact. Readers detect the format on their own.

mod binary;
mod codec;
mod locator;
mod memory;
mod random_access;
mod reader;
mod text;
mod writer;

pub use binary::ValueKind;
pub use codec::{ArchiveValue, DecodeError, TokenList};
pub use locator::{ArchivePath, Locator};
pub use memory::{MemoryArchive, MemoryWriter};
pub use random_access::RandomAccessReader;
pub use reader::SequentialReader;
pub use text::TextLines;
pub use writer::{ArchiveWriter, WriterOptions};

use crate::error::{ArchiveError, ArchiveResult};
use crate::vector::{Matrix, Vector};

/// Forward-only cursor over the records of an archive.
pub trait KeyedStream {
    type Value;

    /// True once every record has been consumed.
    fn done(&self) -> bool;

    /// Key of the current record.
    ///
    /// # Panics
    /// Panics if the stream is [`done`](Self::done).
    fn key(&self) -> &str;

    /// Value of the current record.
    ///
    /// # Panics
    /// Panics if the stream is [`done`](Self::done).
    fn value(&self) -> &Self::Value;

    /// Moves to the next record. A no-op once the stream is done.
    fn next(&mut self) -> ArchiveResult<()>;
}

/// Read-only lookup of values by key.
pub trait KeyedLookup {
    type Value;

    fn has_key(&self, key: &str) -> bool;

    /// Returns the value stored under `key`, or
    /// [`ArchiveError::KeyNotFound`] if there is none.
    fn value(&self, key: &str) -> ArchiveResult<Self::Value>;
}

/// Destination for `(key, value)` records, written in call order.
pub trait KeyedSink {
    type Value;

    fn write(&mut self, key: &str, value: &Self::Value) -> ArchiveResult<()>;

    fn flush(&mut self) -> ArchiveResult<()>;
}

/// Checks that `key` can be stored: non-empty and free of whitespace.
pub fn validate_key(key: &str) -> ArchiveResult<()> {
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(ArchiveError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

pub type VectorReader = SequentialReader<Vector>;
pub type GroupReader = SequentialReader<TokenList>;
pub type RandomAccessVectorReader = RandomAccessReader<Vector>;
pub type VectorWriter = ArchiveWriter<Vector>;
pub type MatrixWriter = ArchiveWriter<Matrix>;
