//! Binary archive framing.
//!
//! # Storage Format
//!
//! - Header (16 bytes): magic `VPAK`, version, value kind, reserved
//! - Records: `key_len u32 | key bytes | payload`, payload depending on kind
//!
//! All integers and floats are little-endian. Unlike the text format, binary
//! archives keep every `f32` bit-exact.

use std::io::{self, ErrorKind, Read, Write};

use super::codec::DecodeError;

/// Magic bytes to identify binary archives.
pub(crate) const MAGIC_BYTES: &[u8; 4] = b"VPAK";

/// Current binary format version.
pub(crate) const ARCHIVE_VERSION: u32 = 1;

/// Size of the archive header in bytes.
pub(crate) const HEADER_SIZE: usize = 16;

/// Number of bytes per f32 value.
const BYTES_PER_F32: usize = 4;

/// Upper bound on a single read buffer so a corrupt length field cannot
/// trigger a huge allocation before the data runs out.
const MAX_CHUNK: usize = 1 << 20;

/// Kind of value stored in a binary archive, recorded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ValueKind {
    Vector = 1,
    Matrix = 2,
    TokenList = 3,
}

impl ValueKind {
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Vector),
            2 => Some(Self::Matrix),
            3 => Some(Self::TokenList),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::TokenList => "token list",
        }
    }
}

/// Returns true if `prefix` starts with the binary archive magic.
#[must_use]
pub(crate) fn is_binary(prefix: &[u8]) -> bool {
    prefix.len() >= MAGIC_BYTES.len() && &prefix[..MAGIC_BYTES.len()] == MAGIC_BYTES
}

/// Reads up to `len` bytes, stopping early only at end of input, however
/// few bytes each underlying `read` returns.
pub(crate) fn read_prefix(input: &mut dyn Read, len: usize) -> io::Result<Vec<u8>> {
    let mut prefix = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match input.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    prefix.truncate(filled);
    Ok(prefix)
}

pub(crate) fn write_header(out: &mut dyn Write, kind: ValueKind) -> io::Result<()> {
    out.write_all(MAGIC_BYTES)?;
    out.write_all(&ARCHIVE_VERSION.to_le_bytes())?;
    out.write_all(&(kind as u32).to_le_bytes())?;
    // Reserved
    out.write_all(&0u32.to_le_bytes())?;
    Ok(())
}

/// Reads and validates the header, checking it holds values of `expected`.
pub(crate) fn read_header(input: &mut dyn Read, expected: ValueKind) -> Result<(), DecodeError> {
    let mut header = [0u8; HEADER_SIZE];
    input.read_exact(&mut header)?;

    if !is_binary(&header) {
        return Err(DecodeError::Malformed("invalid magic bytes".to_string()));
    }

    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if version != ARCHIVE_VERSION {
        return Err(DecodeError::Malformed(format!(
            "unsupported format version {version}, expected {ARCHIVE_VERSION}"
        )));
    }

    let kind_value = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    match ValueKind::from_u32(kind_value) {
        Some(kind) if kind == expected => Ok(()),
        Some(kind) => Err(DecodeError::Malformed(format!(
            "archive holds {} values, expected {}",
            kind.name(),
            expected.name()
        ))),
        None => Err(DecodeError::Malformed(format!(
            "unknown value kind {kind_value}"
        ))),
    }
}

/// Reads a u32, returning `None` on a clean end of input.
pub(crate) fn read_u32_or_eof(input: &mut dyn Read) -> io::Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "truncated record header",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(Some(u32::from_le_bytes(buf)))
}

pub(crate) fn read_u32(input: &mut dyn Read) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn write_u32(out: &mut dyn Write, value: usize) -> io::Result<()> {
    let value = u32::try_from(value)
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "length exceeds u32"))?;
    out.write_all(&value.to_le_bytes())
}

/// Reads `count` little-endian f32 values.
pub(crate) fn read_f32s(input: &mut dyn Read, count: usize) -> Result<Vec<f32>, DecodeError> {
    let mut values = Vec::with_capacity(count.min(MAX_CHUNK / BYTES_PER_F32));
    let mut bytes = vec![0u8; count.min(MAX_CHUNK / BYTES_PER_F32) * BYTES_PER_F32];
    let mut remaining = count;

    while remaining > 0 {
        let chunk = remaining.min(MAX_CHUNK / BYTES_PER_F32);
        let buf = &mut bytes[..chunk * BYTES_PER_F32];
        input.read_exact(buf)?;
        values.extend(
            buf.chunks_exact(BYTES_PER_F32)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        );
        remaining -= chunk;
    }

    Ok(values)
}

pub(crate) fn write_f32s(out: &mut dyn Write, values: &[f32]) -> io::Result<()> {
    for &value in values {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Reads a length-prefixed UTF-8 string.
pub(crate) fn read_string(input: &mut dyn Read) -> Result<String, DecodeError> {
    let len = read_u32(input)? as usize;
    read_string_body(input, len)
}

/// Reads `len` bytes of UTF-8 whose length prefix was already consumed.
pub(crate) fn read_string_body(input: &mut dyn Read, len: usize) -> Result<String, DecodeError> {
    if len > MAX_CHUNK {
        return Err(DecodeError::Malformed(format!(
            "string length {len} exceeds limit"
        )));
    }
    let mut bytes = vec![0u8; len];
    input.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::Malformed("invalid UTF-8".to_string()))
}

pub(crate) fn write_string(out: &mut dyn Write, value: &str) -> io::Result<()> {
    write_u32(out, value.len())?;
    out.write_all(value.as_bytes())
}
