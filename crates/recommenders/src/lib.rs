//! # Recommenders Crate
//!
//! The two scoring strategies behind seed-based recommendations. Given three
//! seed movies, each strategy scores every movie in the catalog.
//!
//! ## Components
//!
//! ### Content Recommender
//! Metadata similarity:
//! - TF-IDF vector per movie over genres, cast, director, plot keywords and tags
//! - Score = mean cosine similarity to the three seeds
//!
//! ### Collaborative Recommender
//! Rating-based affinity:
//! - ALS latent factors learned from the rating matrix
//! - "Users who liked your seeds" averaged over observed and predicted ratings
//!
//! Both implement [`Recommender`], so callers can hold either behind
//! `Arc<dyn Recommender>`.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommenders::{ContentRecommender, MetadataIndex, SeedSet};
//! use data_loader::{Catalog, CatalogPaths};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::load(&CatalogPaths::from_dir(path))?);
//! let content = ContentRecommender::new(Arc::new(MetadataIndex::build(&catalog)));
//!
//! let seeds = SeedSet::new([1, 3, 6])?;
//! let scores = content.score(&seeds)?;
//! ```

pub mod collaborative;
pub mod content;
pub mod error;
pub mod latent;
pub mod metadata;
pub mod traits;
pub mod types;

pub use collaborative::{CollaborativeRecommender, DEFAULT_MAX_NEIGHBOURS};
pub use content::ContentRecommender;
pub use error::{RecommendError, Result};
pub use latent::{FactorConfig, LatentFactorModel};
pub use metadata::{MetadataIndex, MetadataVector, TermId};
pub use traits::Recommender;
pub use types::{ScoreMap, ScoredMovie, SeedSet};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, CatalogBuilder, Movie, Rating};
    use std::sync::Arc;

    fn create_test_catalog() -> Arc<Catalog> {
        let mut builder = CatalogBuilder::new();
        for (id, genre) in [(1, "Drama"), (2, "Drama"), (3, "Comedy"), (4, "Horror")] {
            builder.insert_movie(Movie::new(id, format!("Movie {}", id), vec![genre.to_string()]));
        }
        for movie_id in 1..=3 {
            builder.insert_rating(Rating {
                user_id: 1,
                movie_id,
                rating: 4.5,
                timestamp: 0,
            });
        }
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_strategies_behind_one_trait() {
        let catalog = create_test_catalog();
        let model = LatentFactorModel::train(catalog.clone(), &FactorConfig::default()).unwrap();

        let strategies: Vec<Arc<dyn Recommender>> = vec![
            Arc::new(ContentRecommender::new(Arc::new(MetadataIndex::build(&catalog)))),
            Arc::new(CollaborativeRecommender::new(Arc::new(model))),
        ];

        let seeds = SeedSet::new([1, 2, 3]).unwrap();
        let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["content", "collaborative"]);

        for strategy in &strategies {
            let scores = strategy.score(&seeds).unwrap();
            assert_eq!(scores.len(), catalog.len());
        }
    }
}
