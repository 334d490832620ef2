//! Shared types for the recommender strategies.

use crate::error::{RecommendError, Result};
use data_loader::MovieId;
use std::collections::HashMap;

/// Score for every movie a strategy could rank
pub type ScoreMap = HashMap<MovieId, f32>;

/// Exactly three distinct seed movies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSet([MovieId; 3]);

impl SeedSet {
    /// Fails with `DuplicateSeed` if any id repeats
    pub fn new(ids: [MovieId; 3]) -> Result<Self> {
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(RecommendError::DuplicateSeed(*id));
            }
        }
        Ok(Self(ids))
    }

    pub fn ids(&self) -> &[MovieId; 3] {
        &self.0
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.0.iter().copied()
    }
}

/// One scored movie, as handed to the filter pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
}

impl ScoredMovie {
    pub fn new(movie_id: MovieId, score: f32) -> Self {
        Self { movie_id, score }
    }

    /// Flatten a score map, in no particular order
    pub fn from_scores(scores: ScoreMap) -> Vec<ScoredMovie> {
        scores
            .into_iter()
            .map(|(movie_id, score)| ScoredMovie { movie_id, score })
            .collect()
    }
}
