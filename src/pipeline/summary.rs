//! Per-run accounting and the success policy of each pipeline.

use std::fmt;

use serde::Serialize;

use crate::io::ExitCode;

/// Outcome counters of one finished pipeline run.
pub trait RunSummary: Serialize + fmt::Display {
    /// Whether the run counts as a success.
    fn is_success(&self) -> bool;

    /// Exit status for a run that finished without a fatal error.
    fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::Success
        } else {
            ExitCode::GeneralError
        }
    }
}

/// Which of the two concatenator inputs a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSide {
    First,
    Second,
}

impl fmt::Display for StreamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

/// Result of [`append_vectors`](super::append_vectors).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConcatSummary {
    /// Pairs concatenated and written
    pub num_done: usize,
    /// Input that still had records when the other ran out
    pub leftover: Option<StreamSide>,
}

impl RunSummary for ConcatSummary {
    fn is_success(&self) -> bool {
        self.num_done > 0 && self.leftover.is_none()
    }
}

impl fmt::Display for ConcatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Done {} utterances.", self.num_done)?;
        if let Some(side) = self.leftover {
            write!(f, " The {side} input has unmatched records left over.")?;
        }
        Ok(())
    }
}

/// Result of [`compute_dot_products_dense`](super::compute_dot_products_dense).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimilaritySummary {
    /// Groups whose matrix was written
    pub num_done: usize,
    /// Groups skipped because no member had a vector
    pub num_err: usize,
}

impl RunSummary for SimilaritySummary {
    fn is_success(&self) -> bool {
        self.num_done > 0
    }
}

impl fmt::Display for SimilaritySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} recordings, {} had errors.",
            self.num_done, self.num_err
        )
    }
}

/// Result of [`copy_records`](super::copy_records).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopySummary {
    /// Records copied
    pub num_done: usize,
}

impl RunSummary for CopySummary {
    /// A copy succeeds whenever it finishes, even over an empty archive.
    fn is_success(&self) -> bool {
        true
    }
}

impl fmt::Display for CopySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Copied {} records.", self.num_done)
    }
}
