//! Value encodings for text and binary archives.

use std::io::{self, Read, Write};

use thiserror::Error;

use super::binary::{self, ValueKind};
use super::text::{TextLines, join_floats, parse_floats};
use crate::vector::{Matrix, Vector};

/// An ordered list of keys, e.g. the member list of a group.
pub type TokenList = Vec<String>;

/// Failure while decoding a single record.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Malformed(String),
}

fn malformed(reason: &str) -> DecodeError {
    DecodeError::Malformed(reason.to_string())
}

/// A value that can be stored in a keyed archive.
pub trait ArchiveValue: Sized {
    /// Kind tag written to binary archive headers.
    const KIND: ValueKind;

    /// Decodes the text that follows the key. `rest` is the remainder of the
    /// key's line; multi-line values pull further lines from `lines`.
    fn read_text(rest: &str, lines: &mut TextLines) -> Result<Self, DecodeError>;

    /// Writes one complete text record, key included.
    fn write_text(&self, key: &str, out: &mut dyn Write) -> io::Result<()>;

    /// Decodes one binary payload.
    fn read_binary(input: &mut dyn Read) -> Result<Self, DecodeError>;

    /// Writes one binary payload (the key is written by the caller).
    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl ArchiveValue for Vector {
    const KIND: ValueKind = ValueKind::Vector;

    fn read_text(rest: &str, _lines: &mut TextLines) -> Result<Self, DecodeError> {
        let inner = rest
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| malformed("expected '[ ... ]' after key"))?;
        parse_floats(inner).map_err(DecodeError::Malformed)
    }

    fn write_text(&self, key: &str, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            writeln!(out, "{key} [ ]")
        } else {
            writeln!(out, "{key} [ {} ]", join_floats(self))
        }
    }

    fn read_binary(input: &mut dyn Read) -> Result<Self, DecodeError> {
        let dim = binary::read_u32(input)? as usize;
        binary::read_f32s(input, dim)
    }

    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
        binary::write_u32(out, self.len())?;
        binary::write_f32s(out, self)
    }
}

impl ArchiveValue for Matrix {
    const KIND: ValueKind = ValueKind::Matrix;

    fn read_text(rest: &str, lines: &mut TextLines) -> Result<Self, DecodeError> {
        let body = rest
            .trim_start()
            .strip_prefix('[')
            .ok_or_else(|| malformed("expected '[' after key"))?;

        let mut rows = Vec::new();
        let mut segment = body.to_string();
        loop {
            let (content, closed) = match segment.find(']') {
                Some(idx) => {
                    if !segment[idx + 1..].trim().is_empty() {
                        return Err(malformed("unexpected text after ']'"));
                    }
                    (&segment[..idx], true)
                }
                None => (segment.as_str(), false),
            };

            let row = parse_floats(content).map_err(DecodeError::Malformed)?;
            if !row.is_empty() {
                rows.push(row);
            }
            if closed {
                break;
            }

            segment = match lines.next_line()? {
                Some(line) => line.to_string(),
                None => return Err(malformed("unterminated matrix, missing ']'")),
            };
        }

        Matrix::from_rows(rows).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    fn write_text(&self, key: &str, out: &mut dyn Write) -> io::Result<()> {
        if self.num_rows() == 0 {
            return writeln!(out, "{key} [ ]");
        }
        writeln!(out, "{key} [")?;
        let last = self.num_rows() - 1;
        for (r, row) in self.rows().enumerate() {
            if r == last {
                writeln!(out, "  {} ]", join_floats(row))?;
            } else {
                writeln!(out, "  {}", join_floats(row))?;
            }
        }
        Ok(())
    }

    fn read_binary(input: &mut dyn Read) -> Result<Self, DecodeError> {
        let rows = binary::read_u32(input)? as usize;
        let cols = binary::read_u32(input)? as usize;
        let count = rows
            .checked_mul(cols)
            .ok_or_else(|| malformed("matrix shape overflows"))?;
        let data = binary::read_f32s(input, count)?;
        Matrix::from_vec(rows, cols, data).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
        binary::write_u32(out, self.num_rows())?;
        binary::write_u32(out, self.num_cols())?;
        binary::write_f32s(out, self.as_slice())
    }
}

impl ArchiveValue for TokenList {
    const KIND: ValueKind = ValueKind::TokenList;

    fn read_text(rest: &str, _lines: &mut TextLines) -> Result<Self, DecodeError> {
        Ok(rest.split_whitespace().map(str::to_string).collect())
    }

    fn write_text(&self, key: &str, out: &mut dyn Write) -> io::Result<()> {
        if self.is_empty() {
            writeln!(out, "{key}")
        } else {
            writeln!(out, "{key} {}", self.join(" "))
        }
    }

    fn read_binary(input: &mut dyn Read) -> Result<Self, DecodeError> {
        let count = binary::read_u32(input)? as usize;
        let mut tokens = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            tokens.push(binary::read_string(input)?);
        }
        Ok(tokens)
    }

    fn write_binary(&self, out: &mut dyn Write) -> io::Result<()> {
        binary::write_u32(out, self.len())?;
        for token in self {
            binary::write_string(out, token)?;
        }
        Ok(())
    }
}
