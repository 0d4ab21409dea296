//! Feature extraction
//!
//! Turns two player snapshots and a match context into a schema-ordered row
//! and puts that row into the orientation the classifier was trained on.

pub mod builder;
pub mod row;
pub mod schema;
pub mod symmetry;

pub use builder::FeatureBuilder;
pub use row::FeatureRow;
pub use schema::FeatureSchema;
pub use symmetry::{canonicalize, orient, rank_order_swaps, swap_roles, CanonicalRow};
