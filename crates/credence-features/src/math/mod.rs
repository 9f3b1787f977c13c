//! Dense numeric matrix used as the output of column transformers.
//!
//! `Array2` is a small row-major container; it only carries what the
//! transformers and the classifier need (row access, column extraction,
//! horizontal concatenation).
pub mod matrix;

pub use matrix::{Array2, ShapeError};
