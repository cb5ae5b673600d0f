//! Line-oriented text archive helpers.
//!
//! A text record starts on its own line with the key, followed by whitespace
//! and the value. Vectors and token lists fit on one line; matrices continue
//! on following lines until the closing `]`.

use std::io::{self, BufRead};

/// Line reader that tracks how far into the input it is.
pub struct TextLines {
    input: Box<dyn BufRead>,
    line_number: usize,
    buf: String,
}

impl TextLines {
    pub(crate) fn new(input: Box<dyn BufRead>) -> Self {
        Self {
            input,
            line_number: 0,
            buf: String::new(),
        }
    }

    /// Returns the next line without its terminator, or `None` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<&str>> {
        self.buf.clear();
        if self.input.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let trimmed = self.buf.trim_end_matches(['\n', '\r']).len();
        self.buf.truncate(trimmed);
        Ok(Some(&self.buf))
    }

    /// Returns the next line that is not blank.
    pub fn next_non_blank(&mut self) -> io::Result<Option<&str>> {
        loop {
            let blank = match self.next_line()? {
                None => return Ok(None),
                Some(line) => line.trim().is_empty(),
            };
            if !blank {
                return Ok(Some(&self.buf));
            }
        }
    }

    /// 1-based number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Splits a record line into its key and the rest of the line.
#[must_use]
pub(crate) fn split_key(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], &line[idx..]),
        None => (line, ""),
    }
}

/// Writes floats separated by single spaces.
pub(crate) fn join_floats(values: &[f32]) -> String {
    let mut out = String::with_capacity(values.len() * 8);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&value.to_string());
    }
    out
}

/// Parses whitespace-separated floats.
pub(crate) fn parse_floats(text: &str) -> Result<Vec<f32>, String> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|_| format!("invalid number '{token}'"))
        })
        .collect()
}
