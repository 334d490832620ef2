//! The strategy seam shared by every recommender.

use crate::error::Result;
use crate::types::{ScoreMap, SeedSet};

/// A scoring strategy over the whole catalog.
///
/// ## Design Note
/// - `Send + Sync` lets one instance serve concurrent requests
/// - Implementations score every candidate, seeds included; excluding seeds,
///   ranking and truncation belong to the caller
pub trait Recommender: Send + Sync {
    /// Returns the name of this strategy (for logging/debugging)
    fn name(&self) -> &str;

    /// Score every movie in the catalog against the three seeds.
    fn score(&self, seeds: &SeedSet) -> Result<ScoreMap>;
}
