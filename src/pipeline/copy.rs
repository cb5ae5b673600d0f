//! Record-for-record copy between archives, used to re-encode them.

use tracing::info;

use super::summary::CopySummary;
use crate::archive::{KeyedSink, KeyedStream};
use crate::error::PipelineResult;

/// Writes every record of `input` to `out` in stream order.
pub fn copy_records<R, W>(input: &mut R, out: &mut W) -> PipelineResult<CopySummary>
where
    R: KeyedStream,
    W: KeyedSink<Value = R::Value>,
{
    let mut summary = CopySummary::default();
    while !input.done() {
        out.write(input.key(), input.value())?;
        summary.num_done += 1;
        input.next()?;
    }
    out.flush()?;
    info!("Copied {} records.", summary.num_done);
    Ok(summary)
}
