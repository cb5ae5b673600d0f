//! Locator strings naming where an archive lives and how it is encoded.
//!
//! The grammar is `[ark[,opt...]:]path`, where `path` is a filesystem path or
//! `-` for stdin/stdout. Options:
//!
//! - `t`: write text
//! - `b`: write binary (the default for `ark:`)
//! - `f` / `nf`: flush / don't flush after every record
//!
//! A bare path (no `ark:` prefix) is accepted too. Readers ignore `t`/`b`
//! since they detect the format from the data itself.
//!
//! `scp:path` names a script file of `key target` lines. Scripts can only be
//! read by key (see [`RandomAccessReader`](super::RandomAccessReader)).

use std::path::{Path, PathBuf};

use crate::error::ArchiveError;

/// Where the bytes of an archive come from or go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchivePath {
    /// stdin for readers, stdout for writers
    Stdio,
    File(PathBuf),
}

/// A parsed archive locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    path: ArchivePath,
    binary: Option<bool>,
    flush: Option<bool>,
    script: bool,
}

impl Locator {
    /// Parses a locator string.
    pub fn parse(raw: &str) -> Result<Self, ArchiveError> {
        let invalid = |reason: &str| ArchiveError::InvalidLocator {
            locator: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut binary = None;
        let mut flush = None;
        let mut script = false;

        let path = match raw.split_once(':') {
            Some((prefix, path)) => {
                let mut options = prefix.split(',');
                match options.next().map(str::trim) {
                    Some("ark") => {
                        binary = Some(true);
                        for option in options {
                            match option.trim() {
                                "t" => binary = Some(false),
                                "b" => binary = Some(true),
                                "f" => flush = Some(true),
                                "nf" => flush = Some(false),
                                "" => {}
                                other => {
                                    return Err(invalid(&format!("unknown option '{other}'")));
                                }
                            }
                        }
                        path
                    }
                    Some("scp") => {
                        if options.any(|option| !option.trim().is_empty()) {
                            return Err(invalid("script locators take no options"));
                        }
                        script = true;
                        path
                    }
                    // Not a known scheme, so the colon belongs to the path.
                    _ => raw,
                }
            }
            None => raw,
        };

        let path = path.trim();
        if path.is_empty() {
            return Err(invalid("empty path"));
        }

        let path = if path == "-" {
            ArchivePath::Stdio
        } else {
            ArchivePath::File(PathBuf::from(path))
        };

        Ok(Self {
            raw: raw.to_string(),
            path,
            binary,
            flush,
            script,
        })
    }

    /// The locator as the user wrote it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn path(&self) -> &ArchivePath {
        &self.path
    }

    /// The file path, if this locator does not name stdin/stdout.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        match &self.path {
            ArchivePath::File(path) => Some(path),
            ArchivePath::Stdio => None,
        }
    }

    /// True for `scp:` locators.
    #[must_use]
    pub fn is_script(&self) -> bool {
        self.script
    }

    /// Whether a writer should emit binary, falling back to `default` for
    /// bare paths.
    #[must_use]
    pub fn writes_binary(&self, default: bool) -> bool {
        self.binary.unwrap_or(default)
    }

    /// Whether a writer should flush after every record.
    #[must_use]
    pub fn flushes(&self, default: bool) -> bool {
        self.flush.unwrap_or(default)
    }
}
