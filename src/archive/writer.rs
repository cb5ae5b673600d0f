//! Sequential archive writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::marker::PhantomData;

use super::binary::{self, write_string};
use super::codec::ArchiveValue;
use super::locator::{ArchivePath, Locator};
use super::{KeyedSink, validate_key};
use crate::error::{ArchiveError, ArchiveResult};

/// Settings that decide how a locator is written when it leaves them open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Format for bare-path locators
    pub binary_by_default: bool,
    /// Flush after every record unless the locator says otherwise
    pub flush_each_write: bool,
}

/// Writes `(key, value)` records in call order.
pub struct ArchiveWriter<T> {
    locator: String,
    out: Box<dyn Write>,
    binary: bool,
    flush_each_write: bool,
    written: usize,
    _value: PhantomData<T>,
}

impl<T: ArchiveValue> ArchiveWriter<T> {
    /// Creates (or truncates) the archive named by `locator`.
    pub fn open(locator: &str, options: WriterOptions) -> ArchiveResult<Self> {
        let parsed = Locator::parse(locator)?;
        if parsed.is_script() {
            return Err(ArchiveError::InvalidLocator {
                locator: locator.to_string(),
                reason: "script archives cannot be written".to_string(),
            });
        }
        let out: Box<dyn Write> = match parsed.path() {
            ArchivePath::Stdio => Box::new(io::stdout()),
            ArchivePath::File(path) => {
                let open_error = |source| ArchiveError::Open {
                    path: path.clone(),
                    source,
                };
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(open_error)?;
                }
                Box::new(File::create(path).map_err(open_error)?)
            }
        };

        Self::from_writer(
            locator,
            out,
            parsed.writes_binary(options.binary_by_default),
            parsed.flushes(options.flush_each_write),
        )
    }

    /// Wraps an already open byte sink. `name` is used in error messages.
    pub fn from_writer(
        name: &str,
        out: Box<dyn Write>,
        binary: bool,
        flush_each_write: bool,
    ) -> ArchiveResult<Self> {
        let mut writer = Self {
            locator: name.to_string(),
            out: Box::new(BufWriter::new(out)),
            binary,
            flush_each_write,
            written: 0,
            _value: PhantomData,
        };
        if binary {
            binary::write_header(&mut writer.out, T::KIND).map_err(|e| writer.io_error(e))?;
        }
        Ok(writer)
    }

    /// Number of records written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    fn io_error(&self, source: io::Error) -> ArchiveError {
        ArchiveError::Io {
            locator: self.locator.clone(),
            source,
        }
    }

    fn write_record(&mut self, key: &str, value: &T) -> io::Result<()> {
        if self.binary {
            write_string(&mut self.out, key)?;
            value.write_binary(&mut self.out)?;
        } else {
            value.write_text(key, &mut self.out)?;
        }
        if self.flush_each_write {
            self.out.flush()?;
        }
        Ok(())
    }
}

impl<T: ArchiveValue> KeyedSink for ArchiveWriter<T> {
    type Value = T;

    fn write(&mut self, key: &str, value: &T) -> ArchiveResult<()> {
        validate_key(key)?;
        self.write_record(key, value).map_err(|e| self.io_error(e))?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> ArchiveResult<()> {
        self.out.flush().map_err(|e| self.io_error(e))
    }
}
