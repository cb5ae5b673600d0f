//! Dense vector primitives used by the pipelines.
//!
//! Vectors are plain `f32` slices. Nothing here checks that two vectors share
//! a dimension: `dot` scores the overlapping prefix, which is all a caller
//! gets when it pairs vectors of different lengths.

/// Dot product `Σ a[i] * b[i]` over the overlapping prefix of `a` and `b`.
///
/// # Example
///
/// ```rust
/// use vecpipe::vector::dot;
///
/// assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
/// ```
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm `sqrt(Σ v[i]²)`.
#[inline]
#[must_use]
pub fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Scales `v` in place to unit length. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Returns a new vector holding `a` followed by `b`.
#[must_use]
pub fn concat(a: &[f32], b: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}
