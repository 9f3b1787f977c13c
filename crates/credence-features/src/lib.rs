//! credence-features: named column transformers for tabular credit data.
//!
//! The crate fits per-column-group preprocessing (imputation, scaling,
//! one-hot and weight-of-evidence encoding), keeps the names of every output
//! column, and pairs the fitted transformer with a small classifier so a
//! single JSON artifact can be served.
//!
//! The central type is [`column_transformer::NamedColumnTransformer`].
pub mod column_transformer;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod naming;
pub mod predictor;
pub mod table;
pub mod transform;

pub use column_transformer::{FeatureSets, NamedColumnTransformer, TransformStep};
pub use error::{FeatureError, Result};
pub use predictor::PredictionPipeline;
pub use table::{Record, Table, Value};
