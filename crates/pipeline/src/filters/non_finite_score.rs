//! Filter to drop NaN and infinite scores before ranking.

use crate::traits::Filter;
use recommenders::{ScoredMovie, SeedSet};
use tracing::warn;

pub struct NonFiniteScoreFilter;

impl Filter for NonFiniteScoreFilter {
    fn name(&self) -> &str {
        "NonFiniteScoreFilter"
    }

    fn apply(&self, candidates: Vec<ScoredMovie>, _seeds: &SeedSet) -> Vec<ScoredMovie> {
        let before = candidates.len();
        let filtered: Vec<ScoredMovie> = candidates
            .into_iter()
            .filter(|candidate| candidate.score.is_finite())
            .collect();
        if filtered.len() < before {
            warn!("Dropped {} non-finite scores", before - filtered.len());
        }
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_scores_removed() {
        let seeds = SeedSet::new([1, 2, 3]).unwrap();
        let candidates = vec![
            ScoredMovie::new(10, f32::NAN),
            ScoredMovie::new(11, f32::INFINITY),
            ScoredMovie::new(12, 0.0),
            ScoredMovie::new(13, f32::NEG_INFINITY),
            ScoredMovie::new(14, 4.5),
        ];

        let filtered = NonFiniteScoreFilter.apply(candidates, &seeds);
        let ids: Vec<u32> = filtered.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![12, 14]);
    }
}
