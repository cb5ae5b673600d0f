//! Vector and matrix primitives.
//!
//! Feature vectors are plain `Vec<f32>`; score matrices are dense and
//! row-major. The pipelines only need a dot product, L2 normalization and
//! concatenation, so that is all this module provides.

mod matrix;
mod ops;

pub use matrix::{Matrix, MatrixError};
pub use ops::{concat, dot, l2_norm, l2_normalize};

/// A feature vector as read from an archive.
pub type Vector = Vec<f32>;
