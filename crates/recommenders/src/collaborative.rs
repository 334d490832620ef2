//! Collaborative Recommender - "users who liked your seeds also liked..."
//!
//! ## Algorithm
//! 1. Neighbours = users who rated all three seeds highly
//! 2. If there are none, widen to users who rated at least one seed highly
//! 3. For every movie, score = mean over neighbours of their rating:
//!    the observed rating where one exists, else the model's prediction
//!
//! No neighbours at all is a hard failure; there is nothing to predict from.

use crate::error::{RecommendError, Result};
use crate::latent::LatentFactorModel;
use crate::traits::Recommender;
use crate::types::{ScoreMap, SeedSet};
use data_loader::{MovieId, RATING_MIN, UserId};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const DEFAULT_MAX_NEIGHBOURS: usize = 100;

/// Scores movies by the predicted affinity of users who liked the seeds
#[derive(Clone)]
pub struct CollaborativeRecommender {
    /// Trained factors; also carries the catalog
    model: Arc<LatentFactorModel>,

    /// Maximum number of neighbours averaged per request
    max_neighbours: usize,
}

impl CollaborativeRecommender {
    pub fn new(model: Arc<LatentFactorModel>) -> Self {
        Self {
            model,
            max_neighbours: DEFAULT_MAX_NEIGHBOURS,
        }
    }

    /// Configure how many neighbours are averaged (default: 100)
    pub fn with_max_neighbours(mut self, max_neighbours: usize) -> Self {
        self.max_neighbours = max_neighbours.max(1);
        self
    }

    pub fn model(&self) -> &LatentFactorModel {
        &self.model
    }

    /// Users whose ratings drive the score for these seeds
    pub fn neighbours(&self, seeds: &SeedSet) -> Result<Vec<UserId>> {
        let seed_ids = seeds.ids();

        let strict = self.model.similar_users(seed_ids, self.max_neighbours);
        if !strict.is_empty() {
            debug!("{} users liked every seed", strict.len());
            return Ok(strict);
        }

        let relaxed = self.model.users_rating_any(seed_ids, self.max_neighbours);
        if !relaxed.is_empty() {
            info!(
                "No user liked all seeds {:?}; falling back to {} users who liked any",
                seed_ids,
                relaxed.len()
            );
            return Ok(relaxed);
        }

        Err(RecommendError::InsufficientData {
            reason: format!(
                "no user rated any of the seed movies {:?} at or above {}",
                seed_ids,
                self.model.config().high_rating_threshold
            ),
        })
    }

    /// Score every catalog movie for the seeds
    #[instrument(skip(self), fields(seeds = ?seeds.ids()))]
    pub fn score(&self, seeds: &SeedSet) -> Result<ScoreMap> {
        let catalog = self.model.catalog();
        if let Some(unknown) = seeds.iter().find(|id| !catalog.contains(*id)) {
            return Err(RecommendError::UnknownMovie(unknown));
        }

        let neighbours = self.neighbours(seeds)?;
        let movies: Vec<MovieId> = catalog.movie_ids().collect();

        let scores: ScoreMap = movies
            .par_iter()
            .map(|&movie_id| {
                let total: f32 = neighbours
                    .iter()
                    .map(|&user_id| {
                        catalog
                            .rating(user_id, movie_id)
                            .or_else(|| self.model.predict(user_id, movie_id))
                            .unwrap_or(RATING_MIN)
                    })
                    .sum();
                (movie_id, total / neighbours.len() as f32)
            })
            .collect();

        debug!(
            "Scored {} movies from {} neighbours",
            scores.len(),
            neighbours.len()
        );
        Ok(scores)
    }
}

impl Recommender for CollaborativeRecommender {
    fn name(&self) -> &str {
        "collaborative"
    }

    fn score(&self, seeds: &SeedSet) -> Result<ScoreMap> {
        CollaborativeRecommender::score(self, seeds)
    }
}
