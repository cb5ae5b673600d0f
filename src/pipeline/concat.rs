//! Lockstep concatenation of two keyed vector streams.

use tracing::{debug, info, warn};

use super::summary::{ConcatSummary, StreamSide};
use crate::archive::{KeyedSink, KeyedStream};
use crate::error::{PipelineError, PipelineResult};
use crate::vector::{Vector, concat};

/// Appends each vector of `second` to the vector of `first` under the same key.
///
/// Both streams advance together, one record per step. The i-th records of
/// the two streams must carry the same key; the first step where they don't
/// aborts the run with [`PipelineError::KeyMismatch`] before anything is
/// written for that step. The walk stops as soon as either stream runs out;
/// records left in the other one are reported in the summary, not treated as
/// an error. Vector dimensions of the two inputs are independent.
pub fn append_vectors<A, B, W>(
    first: &mut A,
    second: &mut B,
    out: &mut W,
) -> PipelineResult<ConcatSummary>
where
    A: KeyedStream<Value = Vector>,
    B: KeyedStream<Value = Vector>,
    W: KeyedSink<Value = Vector>,
{
    let mut summary = ConcatSummary::default();

    while !first.done() && !second.done() {
        let key = first.key();
        if key != second.key() {
            return Err(PipelineError::KeyMismatch {
                left: key.to_string(),
                right: second.key().to_string(),
            });
        }

        let joined = concat(first.value(), second.value());
        debug!("{key}: {} + {} dims", first.value().len(), second.value().len());
        out.write(key, &joined)?;
        summary.num_done += 1;

        first.next()?;
        second.next()?;
    }

    if !first.done() {
        summary.leftover = Some(StreamSide::First);
    } else if !second.done() {
        summary.leftover = Some(StreamSide::Second);
    }
    if let Some(side) = summary.leftover {
        warn!("The {side} input has records left after the other input ended");
    }

    out.flush()?;
    info!("Done {} utterances.", summary.num_done);
    Ok(summary)
}
