//! Example: Score three seed movies with both strategies
//!
//! Run with: cargo run --package recommenders --example score_seeds
//!
//! This example shows how to:
//! 1. Load the catalog
//! 2. Build the metadata index and train the latent factors
//! 3. Score a seed set with each strategy
//! 4. Display the best few non-seed movies

use anyhow::Context;
use data_loader::{Catalog, CatalogPaths};
use recommenders::{
    CollaborativeRecommender, ContentRecommender, FactorConfig, LatentFactorModel, MetadataIndex,
    Recommender, ScoredMovie, SeedSet,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const SEED_TITLES: [&str; 3] = ["Toy Story (1995)", "Jumanji (1995)", "Heat (1995)"];

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== ReelRecs Seed Scoring Example ===\n");

    let start = Instant::now();
    let catalog = Arc::new(Catalog::load(&CatalogPaths::from_dir(Path::new(
        "resources/data",
    )))?);
    println!("Loaded catalog in {:?}\n", start.elapsed());

    let mut ids = [0; 3];
    for (slot, title) in ids.iter_mut().zip(SEED_TITLES) {
        *slot = catalog
            .resolve_title(title)
            .with_context(|| format!("seed title {:?}", title))?;
    }
    let seeds = SeedSet::new(ids)?;

    let start = Instant::now();
    let content = ContentRecommender::new(Arc::new(MetadataIndex::build(&catalog)));
    println!("Built metadata index in {:?}", start.elapsed());

    let start = Instant::now();
    let model = LatentFactorModel::train(catalog.clone(), &FactorConfig::default())?;
    println!(
        "Trained latent factors in {:?} (rmse {:.3})\n",
        start.elapsed(),
        model.training_rmse()
    );
    let collaborative = CollaborativeRecommender::new(Arc::new(model));

    let strategies: [&dyn Recommender; 2] = [&content, &collaborative];
    for strategy in strategies {
        let start = Instant::now();
        let scores = strategy.score(&seeds)?;
        let elapsed = start.elapsed();

        let mut scored: Vec<ScoredMovie> = ScoredMovie::from_scores(scores)
            .into_iter()
            .filter(|m| !seeds.contains(m.movie_id))
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.movie_id.cmp(&b.movie_id)));

        println!("Top 5 by {} (scored in {:?}):", strategy.name(), elapsed);
        for (i, scored) in scored.iter().take(5).enumerate() {
            if let Some(movie) = catalog.get_movie(scored.movie_id) {
                println!("  {}. {} (Score: {:.3})", i + 1, movie.title, scored.score);
            }
        }
        println!();
    }

    Ok(())
}
