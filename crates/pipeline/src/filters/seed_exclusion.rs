//! Filter to remove the seed movies themselves.
//!
//! A seed is always its own best match, so this runs on every request.

use crate::traits::Filter;
use recommenders::{ScoredMovie, SeedSet};

/// Removes the three seed movies from the scored set.
pub struct SeedExclusionFilter;

impl Filter for SeedExclusionFilter {
    fn name(&self) -> &str {
        "SeedExclusionFilter"
    }

    fn apply(&self, candidates: Vec<ScoredMovie>, seeds: &SeedSet) -> Vec<ScoredMovie> {
        candidates
            .into_iter()
            .filter(|candidate| !seeds.contains(candidate.movie_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_exclusion_filter() {
        let seeds = SeedSet::new([100, 200, 400]).unwrap();

        let candidates = vec![
            ScoredMovie::new(100, 1.0),
            ScoredMovie::new(101, 0.8),
            ScoredMovie::new(200, 0.7),
            ScoredMovie::new(300, 0.6),
        ];

        let filtered = SeedExclusionFilter.apply(candidates, &seeds);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].movie_id, 101);
        assert_eq!(filtered[1].movie_id, 300);
    }
}
