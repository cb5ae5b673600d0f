//! In-memory archives.
//!
//! These implement the same traits as the file-backed readers and writers so
//! pipelines can run over data that never touches disk.

use std::collections::HashMap;

use super::{KeyedLookup, KeyedSink, KeyedStream, validate_key};
use crate::error::{ArchiveError, ArchiveResult};

/// An ordered list of records usable as a stream or as a lookup table.
#[derive(Debug, Clone)]
pub struct MemoryArchive<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
    position: usize,
}

impl<T> MemoryArchive<T> {
    pub fn new<K: Into<String>>(entries: impl IntoIterator<Item = (K, T)>) -> Self {
        let entries: Vec<(String, T)> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        let mut index = HashMap::with_capacity(entries.len());
        for (i, (key, _)) in entries.iter().enumerate() {
            index.entry(key.clone()).or_insert(i);
        }
        Self {
            entries,
            index,
            position: 0,
        }
    }

    /// Number of records, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records not yet consumed by the stream cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }
}

impl<T> KeyedStream for MemoryArchive<T> {
    type Value = T;

    fn done(&self) -> bool {
        self.position >= self.entries.len()
    }

    fn key(&self) -> &str {
        &self.entries[self.position].0
    }

    fn value(&self) -> &T {
        &self.entries[self.position].1
    }

    fn next(&mut self) -> ArchiveResult<()> {
        if !self.done() {
            self.position += 1;
        }
        Ok(())
    }
}

impl<T: Clone> KeyedLookup for MemoryArchive<T> {
    type Value = T;

    fn has_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn value(&self, key: &str) -> ArchiveResult<T> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1.clone())
            .ok_or_else(|| ArchiveError::KeyNotFound {
                locator: "<memory>".to_string(),
                key: key.to_string(),
            })
    }
}

/// Collects written records in memory.
#[derive(Debug, Clone)]
pub struct MemoryWriter<T> {
    entries: Vec<(String, T)>,
}

impl<T> MemoryWriter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, T)] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<(String, T)> {
        self.entries
    }

    /// Value written under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<T> Default for MemoryWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> KeyedSink for MemoryWriter<T> {
    type Value = T;

    fn write(&mut self, key: &str, value: &T) -> ArchiveResult<()> {
        validate_key(key)?;
        self.entries.push((key.to_string(), value.clone()));
        Ok(())
    }

    fn flush(&mut self) -> ArchiveResult<()> {
        Ok(())
    }
}
