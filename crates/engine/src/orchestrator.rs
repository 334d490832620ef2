//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request:
//! 1. Validate the input (exactly three titles, `top_n >= 1`)
//! 2. Resolve titles to catalog ids and reject duplicates
//! 3. Score the whole catalog with the selected strategy
//! 4. Apply filters (invalid scores, unknown ids, the seeds themselves)
//! 5. Rank by score, ties by ascending id, and truncate
//! 6. Map ids back to titles
//!
//! The strategies and the catalog are built once in [`RecommendationOrchestrator::build`]
//! and shared read-only, so one orchestrator serves concurrent requests.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use data_loader::{Catalog, MovieId};
use pipeline::filters::{CatalogMembershipFilter, NonFiniteScoreFilter, SeedExclusionFilter};
use pipeline::{FilterPipeline, rank};
use recommenders::{
    CollaborativeRecommender, ContentRecommender, LatentFactorModel, MetadataIndex, Recommender,
    ScoredMovie, SeedSet,
};

use crate::config::EngineConfig;
use crate::error::{RecommendationError, Result};

/// Number of seed titles every request must supply
pub const SEED_COUNT: usize = 3;

/// Which scoring strategy serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Content,
    Collaborative,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Content, Strategy::Collaborative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Content => "content",
            Strategy::Collaborative => "collaborative",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "content" => Ok(Strategy::Content),
            "collaborative" | "collab" => Ok(Strategy::Collaborative),
            other => Err(format!(
                "unknown strategy {:?} (expected content or collaborative)",
                other
            )),
        }
    }
}

/// One ranked result
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub score: f32,
}

/// Main orchestrator that serves recommendation requests
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    content: Arc<ContentRecommender>,

    /// `None` when the catalog has no ratings to factorize
    collaborative: Option<Arc<CollaborativeRecommender>>,

    filter_pipeline: Arc<FilterPipeline>,
}

impl RecommendationOrchestrator {
    /// Build both strategies over the catalog
    ///
    /// The metadata index and the latent factors are built in parallel.
    /// Training is the slow part of startup; it fails the whole build on an
    /// invalid configuration. A catalog without ratings still serves
    /// content requests.
    #[instrument(skip_all, fields(movies = catalog.len()))]
    pub fn build(catalog: Arc<Catalog>, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let start_time = Instant::now();

        let has_ratings = catalog.counts().ratings > 0;
        let (index, model) = rayon::join(
            || MetadataIndex::build(&catalog),
            || {
                has_ratings
                    .then(|| LatentFactorModel::train(catalog.clone(), &config.factors))
                    .transpose()
            },
        );

        let content = Arc::new(ContentRecommender::new(Arc::new(index)));
        let collaborative = model?.map(|model| {
            Arc::new(
                CollaborativeRecommender::new(Arc::new(model))
                    .with_max_neighbours(config.collaborative.max_neighbours),
            )
        });
        if collaborative.is_none() {
            warn!("Catalog has no ratings; collaborative recommendations are unavailable");
        }

        let filter_pipeline = Arc::new(
            FilterPipeline::new()
                .add_filter(NonFiniteScoreFilter)
                .add_filter(CatalogMembershipFilter::new(catalog.clone()))
                .add_filter(SeedExclusionFilter),
        );

        info!("Engine ready in {:.2?}", start_time.elapsed());

        Ok(Self {
            catalog,
            content,
            collaborative,
            filter_pipeline,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Whether `strategy` can serve requests
    pub fn is_available(&self, strategy: Strategy) -> bool {
        match strategy {
            Strategy::Content => true,
            Strategy::Collaborative => self.collaborative.is_some(),
        }
    }

    /// Ranked titles for three seed titles
    pub fn recommend<S: AsRef<str>>(
        &self,
        strategy: Strategy,
        titles: &[S],
        top_n: usize,
    ) -> Result<Vec<String>> {
        let recommendations = self.recommend_scored(strategy, titles, top_n)?;
        Ok(recommendations.into_iter().map(|rec| rec.title).collect())
    }

    /// Ranked movies with their scores for three seed titles
    ///
    /// Returns fewer than `top_n` results when the catalog minus the seeds
    /// is smaller; that is not an error.
    pub fn recommend_scored<S: AsRef<str>>(
        &self,
        strategy: Strategy,
        titles: &[S],
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        let start_time = Instant::now();

        if top_n == 0 {
            return Err(RecommendationError::InvalidTopN { top_n });
        }
        let seeds = self.resolve_seeds(titles)?;

        let recommender = self.recommender(strategy)?;
        let scores = recommender.score(&seeds)?;

        let filtered = self
            .filter_pipeline
            .apply(ScoredMovie::from_scores(scores), &seeds);
        let ranked = rank(filtered, top_n);

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .filter_map(|scored| {
                let movie = self.catalog.get_movie(scored.movie_id)?;
                Some(Recommendation {
                    movie_id: scored.movie_id,
                    title: movie.title.clone(),
                    year: movie.year,
                    score: scored.score,
                })
            })
            .collect();

        debug!(
            "{} recommendations for {:?} in {:.2?}: {} results",
            strategy,
            seeds.ids(),
            start_time.elapsed(),
            recommendations.len()
        );
        Ok(recommendations)
    }

    /// Validate arity, resolve each title and reject repeats
    pub fn resolve_seeds<S: AsRef<str>>(&self, titles: &[S]) -> Result<SeedSet> {
        if titles.len() != SEED_COUNT {
            return Err(RecommendationError::InvalidSeedCount { got: titles.len() });
        }

        let mut ids: [MovieId; SEED_COUNT] = [0; SEED_COUNT];
        for (i, title) in titles.iter().enumerate() {
            let title = title.as_ref();
            let id = self.catalog.resolve_title(title)?;
            if ids[..i].contains(&id) {
                return Err(RecommendationError::DuplicateSeed {
                    title: title.to_string(),
                });
            }
            ids[i] = id;
        }

        Ok(SeedSet::new(ids)?)
    }

    fn recommender(&self, strategy: Strategy) -> Result<&dyn Recommender> {
        match strategy {
            Strategy::Content => Ok(&*self.content as &dyn Recommender),
            Strategy::Collaborative => self
                .collaborative
                .as_deref()
                .map(|collaborative| collaborative as &dyn Recommender)
                .ok_or_else(|| RecommendationError::ModelUnavailable {
                    reason: "no latent factor model was trained (the catalog has no ratings)"
                        .to_string(),
                }),
        }
    }
}
