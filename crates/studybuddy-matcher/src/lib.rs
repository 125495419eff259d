//! Study-partner matching.
//!
//! Scores a subject against a candidate pool with a weighted per-category
//! Jaccard index over courses, study spots and study times, and returns the
//! overlapping candidates ranked best first.

pub mod error;
pub mod matcher;
pub mod store;
pub mod weights;

pub use error::MatchError;
pub use matcher::{Matcher, compute_matches};
pub use store::{ProfileStore, matches_for};
pub use weights::{MatchWeights, SPOT_TIME_TOLERANCE};
