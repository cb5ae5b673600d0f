//! Forward-only archive reader.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, ErrorKind, Read};

use super::binary::{self, MAGIC_BYTES, read_u32_or_eof};
use super::codec::{ArchiveValue, DecodeError};
use super::locator::{ArchivePath, Locator};
use super::text::{TextLines, split_key};
use super::KeyedStream;
use crate::error::{ArchiveError, ArchiveResult};

enum Source {
    Text(TextLines),
    Binary(Box<dyn BufRead>),
}

/// Reads `(key, value)` records one at a time, in archive order.
///
/// The reader is always positioned on a record until [`done`] reports the
/// end of input. Text and binary archives are told apart by the binary magic
/// bytes, so the same locator syntax works for both.
///
/// [`done`]: KeyedStream::done
pub struct SequentialReader<T> {
    locator: String,
    source: Source,
    current: Option<(String, T)>,
    record: usize,
}

impl<T: ArchiveValue> SequentialReader<T> {
    /// Opens the archive named by `locator` and reads its first record.
    pub fn open(locator: &str) -> ArchiveResult<Self> {
        let parsed = Locator::parse(locator)?;
        if parsed.is_script() {
            return Err(ArchiveError::InvalidLocator {
                locator: locator.to_string(),
                reason: "script archives can only be read by key".to_string(),
            });
        }
        let input: Box<dyn Read> = match parsed.path() {
            ArchivePath::Stdio => Box::new(io::stdin()),
            ArchivePath::File(path) => {
                Box::new(File::open(path).map_err(|source| ArchiveError::Open {
                    path: path.clone(),
                    source,
                })?)
            }
        };
        Self::from_reader(locator, input)
    }

    /// Wraps an already open byte source. `name` is used in error messages.
    pub fn from_reader(name: &str, mut input: Box<dyn Read>) -> ArchiveResult<Self> {
        let prefix = binary::read_prefix(&mut input, MAGIC_BYTES.len()).map_err(|source| {
            ArchiveError::Io {
                locator: name.to_string(),
                source,
            }
        })?;
        let is_binary = binary::is_binary(&prefix);
        let mut input: Box<dyn BufRead> =
            Box::new(BufReader::new(Cursor::new(prefix).chain(input)));

        let source = if is_binary {
            binary::read_header(&mut input, T::KIND)
                .map_err(|e| decode_error(name, 0, e))?;
            Source::Binary(input)
        } else {
            Source::Text(TextLines::new(input))
        };

        let mut reader = Self {
            locator: name.to_string(),
            source,
            current: None,
            record: 0,
        };
        reader.read_next()?;
        Ok(reader)
    }

    /// Name of the archive this reader was opened on.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Moves out the current record and advances.
    pub fn take_next(&mut self) -> ArchiveResult<Option<(String, T)>> {
        let current = self.current.take();
        if current.is_some() {
            self.read_next()?;
        }
        Ok(current)
    }

    fn read_next(&mut self) -> ArchiveResult<()> {
        self.record += 1;
        let record = self.record;
        let next = match &mut self.source {
            Source::Text(lines) => {
                let result = read_text_record::<T>(lines);
                result.map_err(|e| at_line(e, lines.line_number()))
            }
            Source::Binary(input) => read_binary_record::<T>(input),
        };
        self.current = next.map_err(|e| decode_error(&self.locator, record, e))?;
        Ok(())
    }
}

fn read_text_record<T: ArchiveValue>(
    lines: &mut TextLines,
) -> Result<Option<(String, T)>, DecodeError> {
    let line = match lines.next_non_blank()? {
        Some(line) => line.to_string(),
        None => return Ok(None),
    };
    let (key, rest) = split_key(&line);
    let value = T::read_text(rest, lines)?;
    Ok(Some((key.to_string(), value)))
}

fn read_binary_record<T: ArchiveValue>(
    input: &mut dyn Read,
) -> Result<Option<(String, T)>, DecodeError> {
    let key_len = match read_u32_or_eof(input)? {
        Some(len) => len as usize,
        None => return Ok(None),
    };
    let key = binary::read_string_body(input, key_len)?;
    let value = T::read_binary(input)?;
    Ok(Some((key, value)))
}

/// Adds the text line a malformed record was found on.
fn at_line(error: DecodeError, line: usize) -> DecodeError {
    match error {
        DecodeError::Malformed(reason) => DecodeError::Malformed(format!("{reason} (line {line})")),
        other => other,
    }
}

/// Turns a decode failure into an archive error naming the record.
pub(crate) fn decode_error(locator: &str, record: usize, error: DecodeError) -> ArchiveError {
    match error {
        DecodeError::Io(e) if e.kind() == ErrorKind::UnexpectedEof => ArchiveError::InvalidFormat {
            locator: locator.to_string(),
            record,
            reason: "truncated record".to_string(),
        },
        DecodeError::Io(source) => ArchiveError::Io {
            locator: locator.to_string(),
            source,
        },
        DecodeError::Malformed(reason) => ArchiveError::InvalidFormat {
            locator: locator.to_string(),
            record,
            reason,
        },
    }
}

impl<T: ArchiveValue> KeyedStream for SequentialReader<T> {
    type Value = T;

    fn done(&self) -> bool {
        self.current.is_none()
    }

    fn key(&self) -> &str {
        match &self.current {
            Some((key, _)) => key,
            None => panic!("key() called on exhausted archive '{}'", self.locator),
        }
    }

    fn value(&self) -> &T {
        match &self.current {
            Some((_, value)) => value,
            None => panic!("value() called on exhausted archive '{}'", self.locator),
        }
    }

    fn next(&mut self) -> ArchiveResult<()> {
        if self.current.is_some() {
            self.read_next()?;
        }
        Ok(())
    }
}
