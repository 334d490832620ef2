//! Core traits for the post-scoring pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to scored movies.

use recommenders::{ScoredMovie, SeedSet};

/// Core trait for filtering scored movies.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be used in concurrent contexts
/// - Filters take ownership of the Vec<ScoredMovie> and return a filtered Vec
/// - Filtering cannot fail; a filter only ever drops entries
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of scored movies.
    ///
    /// # Arguments
    /// * `candidates` - The scored movies to filter (takes ownership)
    /// * `seeds` - The seed movies of the request
    fn apply(&self, candidates: Vec<ScoredMovie>, seeds: &SeedSet) -> Vec<ScoredMovie>;
}
