//! Features Module - Model input contract
//!
//! `schema` holds the ordered feature list the classifier was trained on,
//! `reconcile` turns any encoded frame into vectors of exactly that layout.

pub mod reconcile;
pub mod schema;

pub use reconcile::{reconcile, FeatureMatrix, ReconcileReport};
pub use schema::{FeatureSchema, LayoutInfo};
