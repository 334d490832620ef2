//! The FilterPipeline chains multiple filters.

use crate::traits::Filter;
use recommenders::{ScoredMovie, SeedSet};
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(NonFiniteScoreFilter)
///     .add_filter(SeedExclusionFilter);
///
/// let filtered = pipeline.apply(scored, &seeds);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in insertion order.
    pub fn apply(&self, candidates: Vec<ScoredMovie>, seeds: &SeedSet) -> Vec<ScoredMovie> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, seeds);
            debug!(
                "Filter {}: {} -> {} movies",
                filter.name(),
                before,
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
