//! Random-access archive reader.
//!
//! Binary archives on disk are memory-mapped and indexed by key when opened;
//! values are decoded on lookup straight from the mapping. Text archives and
//! anything read from stdin are parsed into memory up front, as are the
//! values a `scp:` script points at.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};

use memmap2::{Mmap, MmapOptions};
use tracing::{debug, warn};

use super::KeyedLookup;
use super::binary::{self, HEADER_SIZE, MAGIC_BYTES};
use super::codec::{ArchiveValue, DecodeError, TokenList};
use super::locator::{ArchivePath, Locator};
use super::reader::{SequentialReader, decode_error};
use crate::error::{ArchiveError, ArchiveResult};

enum Store<T> {
    Mapped {
        mmap: Mmap,
        offsets: HashMap<String, usize>,
    },
    Loaded(HashMap<String, T>),
}

/// Looks up values by key, in any order, any number of times.
///
/// When a key occurs more than once, the first occurrence wins.
pub struct RandomAccessReader<T> {
    locator: String,
    store: Store<T>,
}

impl<T: ArchiveValue + Clone> RandomAccessReader<T> {
    /// Opens and indexes the archive named by `locator`.
    pub fn open(locator: &str) -> ArchiveResult<Self> {
        let parsed = Locator::parse(locator)?;
        if parsed.is_script() {
            return Self::from_script(locator, &parsed);
        }

        let Some(path) = parsed.file() else {
            return Self::load(SequentialReader::open(locator)?);
        };

        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let magic = binary::read_prefix(&mut &file, MAGIC_BYTES.len()).map_err(|source| {
            ArchiveError::Io {
                locator: locator.to_string(),
                source,
            }
        })?;
        let is_binary = binary::is_binary(&magic);

        if !is_binary {
            return Self::load(SequentialReader::open(locator)?);
        }

        // SAFETY: the mapping is read-only and the archive is not expected to
        // change while a pipeline run holds it open.
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|source| {
            ArchiveError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let offsets = index_mapped::<T>(locator, &mmap)?;
        debug!("Indexed {} keys in {locator}", offsets.len());

        Ok(Self {
            locator: locator.to_string(),
            store: Store::Mapped { mmap, offsets },
        })
    }

    /// Drains a sequential reader into memory.
    pub fn load(mut reader: SequentialReader<T>) -> ArchiveResult<Self> {
        let locator = reader.locator().to_string();
        let mut values = HashMap::new();
        while let Some((key, value)) = reader.take_next()? {
            match values.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(slot) => {
                    warn!("Duplicate key '{}' in {locator}, keeping the first", slot.key());
                }
            }
        }
        debug!("Loaded {} keys from {locator}", values.len());

        Ok(Self {
            locator,
            store: Store::Loaded(values),
        })
    }

    /// Resolves every `key target` line of a script up front.
    ///
    /// A target is either `path:offset`, where `offset` is the byte position
    /// of a value inside a binary archive, or a locator of an archive whose
    /// first record holds the value.
    fn from_script(locator: &str, parsed: &Locator) -> ArchiveResult<Self> {
        let input: Box<dyn Read> = match parsed.path() {
            ArchivePath::Stdio => Box::new(io::stdin()),
            ArchivePath::File(path) => {
                Box::new(File::open(path).map_err(|source| ArchiveError::Open {
                    path: path.clone(),
                    source,
                })?)
            }
        };
        let mut lines = SequentialReader::<TokenList>::from_reader(locator, input)?;

        let mut values = HashMap::new();
        let mut record = 0;
        while let Some((key, targets)) = lines.take_next()? {
            record += 1;
            let [target] = targets.as_slice() else {
                return Err(ArchiveError::InvalidFormat {
                    locator: locator.to_string(),
                    record,
                    reason: format!("expected one target for '{key}', found {}", targets.len()),
                });
            };
            match values.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(resolve_target::<T>(target)?);
                }
                Entry::Occupied(slot) => {
                    warn!("Duplicate key '{}' in {locator}, keeping the first", slot.key());
                }
            }
        }
        debug!("Resolved {} keys from {locator}", values.len());

        Ok(Self {
            locator: locator.to_string(),
            store: Store::Loaded(values),
        })
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Mapped { offsets, .. } => offsets.len(),
            Store::Loaded(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

/// Reads the value a script target points at.
fn resolve_target<T: ArchiveValue>(target: &str) -> ArchiveResult<T> {
    let with_offset = target
        .rsplit_once(':')
        .and_then(|(path, offset)| offset.parse::<u64>().ok().map(|offset| (path, offset)));

    match with_offset {
        Some((path, offset)) => read_at_offset(target, path, offset),
        None => {
            let mut reader = SequentialReader::<T>::open(target)?;
            match reader.take_next()? {
                Some((_, value)) => Ok(value),
                None => Err(ArchiveError::InvalidFormat {
                    locator: target.to_string(),
                    record: 1,
                    reason: "archive is empty".to_string(),
                }),
            }
        }
    }
}

fn read_at_offset<T: ArchiveValue>(target: &str, path: &str, offset: u64) -> ArchiveResult<T> {
    let parsed = Locator::parse(path)?;
    let Some(path) = parsed.file() else {
        return Err(ArchiveError::InvalidLocator {
            locator: target.to_string(),
            reason: "offsets need a file, not stdin".to_string(),
        });
    };
    if offset < HEADER_SIZE as u64 {
        return Err(ArchiveError::InvalidFormat {
            locator: target.to_string(),
            record: 0,
            reason: format!("offset {offset} points into the archive header"),
        });
    }

    let file = File::open(path).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut input = BufReader::new(file);
    binary::read_header(&mut input, T::KIND).map_err(|e| decode_error(target, 0, e))?;
    input
        .seek(SeekFrom::Start(offset))
        .map_err(|source| ArchiveError::Io {
            locator: target.to_string(),
            source,
        })?;
    T::read_binary(&mut input).map_err(|e| decode_error(target, 0, e))
}

/// Walks every record of a mapped archive, remembering where each value starts.
fn index_mapped<T: ArchiveValue>(
    locator: &str,
    mmap: &Mmap,
) -> ArchiveResult<HashMap<String, usize>> {
    let mut cursor = Cursor::new(&mmap[..]);
    binary::read_header(&mut cursor, T::KIND).map_err(|e| decode_error(locator, 0, e))?;
    debug_assert_eq!(cursor.position() as usize, HEADER_SIZE);

    let mut offsets = HashMap::new();
    let mut record = 0;
    loop {
        record += 1;
        let key_len = match binary::read_u32_or_eof(&mut cursor) {
            Ok(Some(len)) => len as usize,
            Ok(None) => break,
            Err(e) => return Err(decode_error(locator, record, DecodeError::Io(e))),
        };
        let key = binary::read_string_body(&mut cursor, key_len)
            .map_err(|e| decode_error(locator, record, e))?;
        let offset = cursor.position() as usize;
        // Decoding validates the payload and moves past it.
        T::read_binary(&mut cursor).map_err(|e| decode_error(locator, record, e))?;

        match offsets.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(offset);
            }
            Entry::Occupied(slot) => {
                warn!("Duplicate key '{}' in {locator}, keeping the first", slot.key());
            }
        }
    }

    Ok(offsets)
}

impl<T: ArchiveValue + Clone> KeyedLookup for RandomAccessReader<T> {
    type Value = T;

    fn has_key(&self, key: &str) -> bool {
        match &self.store {
            Store::Mapped { offsets, .. } => offsets.contains_key(key),
            Store::Loaded(values) => values.contains_key(key),
        }
    }

    fn value(&self, key: &str) -> ArchiveResult<T> {
        let not_found = || ArchiveError::KeyNotFound {
            locator: self.locator.clone(),
            key: key.to_string(),
        };
        match &self.store {
            Store::Mapped { mmap, offsets } => {
                let offset = *offsets.get(key).ok_or_else(not_found)?;
                let mut cursor = Cursor::new(&mmap[offset..]);
                T::read_binary(&mut cursor).map_err(|e| decode_error(&self.locator, 0, e))
            }
            Store::Loaded(values) => values.get(key).cloned().ok_or_else(not_found),
        }
    }
}
