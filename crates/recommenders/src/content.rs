//! Content Recommender - metadata similarity to the seeds
//!
//! ## Algorithm
//! 1. Look up the metadata vector of each of the three seeds
//! 2. For every movie, compute its cosine similarity to each seed
//! 3. Score = arithmetic mean of the three similarities
//!
//! Averaging rewards movies close to several seeds over movies that are a
//! near-copy of just one. A seed without metadata contributes 0 to every
//! candidate; only a seed set with no metadata at all is an error.

use crate::error::{RecommendError, Result};
use crate::metadata::{MetadataIndex, MetadataVector};
use crate::traits::Recommender;
use crate::types::{ScoreMap, SeedSet};
use data_loader::MovieId;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Scores movies by mean cosine similarity to the seed movies
#[derive(Clone)]
pub struct ContentRecommender {
    /// Shared, read-only TF-IDF vectors
    index: Arc<MetadataIndex>,
}

impl ContentRecommender {
    pub fn new(index: Arc<MetadataIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &MetadataIndex {
        &self.index
    }

    fn seed_vectors(&self, seeds: &SeedSet) -> Result<[&MetadataVector; 3]> {
        let [a, b, c] = *seeds.ids();
        let lookup = |id: MovieId| {
            self.index
                .vector_of(id)
                .ok_or(RecommendError::UnknownMovie(id))
        };
        let vectors = [lookup(a)?, lookup(b)?, lookup(c)?];

        let silent: Vec<MovieId> = seeds
            .iter()
            .zip(vectors.iter())
            .filter(|(_, vector)| vector.is_zero())
            .map(|(id, _)| id)
            .collect();
        if silent.len() == vectors.len() {
            return Err(RecommendError::InsufficientData {
                reason: format!("none of the seed movies {:?} has any metadata", seeds.ids()),
            });
        }
        if !silent.is_empty() {
            warn!(
                "Seed movies {:?} have no metadata and contribute nothing",
                silent
            );
        }
        Ok(vectors)
    }

    /// Score every movie in the index against the seeds
    #[instrument(skip(self), fields(seeds = ?seeds.ids()))]
    pub fn score(&self, seeds: &SeedSet) -> Result<ScoreMap> {
        let seed_vectors = self.seed_vectors(seeds)?;

        let candidates: Vec<(MovieId, &MetadataVector)> = self.index.iter().collect();
        let scores: ScoreMap = candidates
            .par_iter()
            .map(|(movie_id, vector)| {
                let mut similarities = seed_vectors.map(|seed| seed.cosine(vector));
                // Summed in sorted order so the mean is identical under seed permutation
                similarities.sort_by(f32::total_cmp);
                let mean = similarities.iter().sum::<f32>() / similarities.len() as f32;
                (*movie_id, mean.clamp(0.0, 1.0))
            })
            .collect();

        debug!("Scored {} movies by content", scores.len());
        Ok(scores)
    }
}

impl Recommender for ContentRecommender {
    fn name(&self) -> &str {
        "content"
    }

    fn score(&self, seeds: &SeedSet) -> Result<ScoreMap> {
        ContentRecommender::score(self, seeds)
    }
}
