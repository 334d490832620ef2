//! Final ordering of the filtered movies.
//!
//! Ordering is total and deterministic: score descending, then movie id
//! ascending. A movie that appears twice keeps its highest score.

use recommenders::ScoredMovie;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Score descending, ties broken by ascending movie id
pub fn compare(a: &ScoredMovie, b: &ScoredMovie) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.movie_id.cmp(&b.movie_id))
}

/// Dedupe, sort and keep the best `limit` movies.
pub fn rank(candidates: Vec<ScoredMovie>, limit: usize) -> Vec<ScoredMovie> {
    let mut best: HashMap<_, f32> = HashMap::with_capacity(candidates.len());
    for candidate in candidates {
        best.entry(candidate.movie_id)
            .and_modify(|score| {
                if candidate.score.total_cmp(score) == Ordering::Greater {
                    *score = candidate.score;
                }
            })
            .or_insert(candidate.score);
    }

    let mut ranked: Vec<ScoredMovie> = best
        .into_iter()
        .map(|(movie_id, score)| ScoredMovie::new(movie_id, score))
        .collect();
    ranked.sort_unstable_by(compare);
    ranked.truncate(limit);
    ranked
}
