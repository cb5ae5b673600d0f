//! Dense pairwise dot-product scoring within groups of keys.

use tracing::{debug, info, warn};

use super::summary::SimilaritySummary;
use crate::archive::{KeyedLookup, KeyedSink, KeyedStream, TokenList};
use crate::error::{PipelineError, PipelineResult};
use crate::vector::{Matrix, Vector, dot, l2_normalize};

/// Knobs for [`compute_dot_products_dense`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimilarityOptions {
    /// L2-normalize every vector before scoring, turning dot products into
    /// cosine similarities.
    pub normalize: bool,
}

/// Writes one square score matrix per group.
///
/// For each group in stream order, every member key is looked up in `vectors`
/// in member-list order, and `matrix[i][j] = dot(v_i, v_j)` is filled for the
/// whole Cartesian product of members. A member without a vector aborts the
/// run with [`PipelineError::MissingVector`]; matrices already written stay
/// written. A group with no members produces no matrix and is counted in
/// [`SimilaritySummary::num_err`].
pub fn compute_dot_products_dense<G, S, W>(
    groups: &mut G,
    vectors: &S,
    out: &mut W,
    options: SimilarityOptions,
) -> PipelineResult<SimilaritySummary>
where
    G: KeyedStream<Value = TokenList>,
    S: KeyedLookup<Value = Vector>,
    W: KeyedSink<Value = Matrix>,
{
    let mut summary = SimilaritySummary::default();

    while !groups.done() {
        let group = groups.key();
        let members = groups.value();

        let mut resolved = Vec::with_capacity(members.len());
        for member in members {
            if !vectors.has_key(member) {
                return Err(PipelineError::MissingVector {
                    group: group.to_string(),
                    member: member.clone(),
                });
            }
            let mut vector = vectors.value(member)?;
            if options.normalize {
                l2_normalize(&mut vector);
            }
            resolved.push(vector);
        }

        if resolved.is_empty() {
            warn!("Not producing output for recording {group} since no segments had vectors");
            summary.num_err += 1;
        } else {
            if mixed_dimensions(&resolved) {
                warn!("Vectors in {group} differ in dimension, scoring their shared prefix");
            }
            let scores = dense_dot_products(&resolved);
            debug!("{group}: {n}x{n} scores", n = resolved.len());
            out.write(group, &scores)?;
            summary.num_done += 1;
        }

        groups.next()?;
    }

    out.flush()?;
    info!(
        "Processed {} recordings, {} had errors.",
        summary.num_done, summary.num_err
    );
    Ok(summary)
}

fn mixed_dimensions(vectors: &[Vector]) -> bool {
    vectors.windows(2).any(|pair| pair[0].len() != pair[1].len())
}

/// Builds the full `n x n` matrix of dot products between `vectors`.
///
/// Every cell is computed, the diagonal and both triangles included, so the
/// result is symmetric by construction rather than by copying.
#[must_use]
pub fn dense_dot_products(vectors: &[Vector]) -> Matrix {
    let n = vectors.len();
    let mut scores = Matrix::zeros(n, n);
    for (i, vi) in vectors.iter().enumerate() {
        for (j, vj) in vectors.iter().enumerate() {
            scores.set(i, j, dot(vi, vj));
        }
    }
    scores
}
