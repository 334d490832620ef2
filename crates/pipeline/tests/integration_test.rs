//! Integration tests for the pipeline.
//!
//! These tests run both strategies over the fixture catalog and push the
//! scores through the filters and ranking, as a request would.

use data_loader::{Catalog, CatalogPaths};
use pipeline::filters::*;
use pipeline::{FilterPipeline, rank};
use recommenders::{
    CollaborativeRecommender, ContentRecommender, FactorConfig, LatentFactorModel, MetadataIndex,
    Recommender, ScoredMovie, SeedSet,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

fn create_test_setup() -> (Arc<Catalog>, FilterPipeline) {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../data-loader/tests/fixtures");
    let catalog = Arc::new(Catalog::load(&CatalogPaths::from_dir(&fixtures)).unwrap());

    let pipeline = FilterPipeline::new()
        .add_filter(NonFiniteScoreFilter)
        .add_filter(CatalogMembershipFilter::new(catalog.clone()))
        .add_filter(SeedExclusionFilter);

    (catalog, pipeline)
}

fn run(strategy: &dyn Recommender, pipeline: &FilterPipeline, seeds: &SeedSet, top_n: usize) -> Vec<ScoredMovie> {
    let scores = strategy.score(seeds).unwrap();
    let filtered = pipeline.apply(ScoredMovie::from_scores(scores), seeds);
    rank(filtered, top_n)
}

fn assert_well_formed(ranked: &[ScoredMovie], seeds: &SeedSet) {
    let unique: HashSet<u32> = ranked.iter().map(|m| m.movie_id).collect();
    assert_eq!(unique.len(), ranked.len(), "duplicate movie in output");
    assert!(ranked.iter().all(|m| !seeds.contains(m.movie_id)));
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_content_pipeline_end_to_end() {
    let (catalog, pipeline) = create_test_setup();
    let content = ContentRecommender::new(Arc::new(MetadataIndex::build(&catalog)));
    let seeds = SeedSet::new([1, 2, 6]).unwrap();

    let ranked = run(&content, &pipeline, &seeds, 10);

    // 9 movies minus 3 seeds
    assert_eq!(ranked.len(), 6);
    assert_well_formed(&ranked, &seeds);

    // Truncation keeps the head of the full ranking
    let top_two = run(&content, &pipeline, &seeds, 2);
    assert_eq!(top_two, ranked[..2].to_vec());
}

#[test]
fn test_collaborative_pipeline_end_to_end() {
    let (catalog, pipeline) = create_test_setup();
    let model = LatentFactorModel::train(catalog.clone(), &FactorConfig::default()).unwrap();
    let collaborative = CollaborativeRecommender::new(Arc::new(model));

    // Only user 1 liked all of 1, 6 and 9, and rated movie 3 a 4.0
    let seeds = SeedSet::new([1, 6, 9]).unwrap();
    let ranked = run(&collaborative, &pipeline, &seeds, 10);

    assert_eq!(ranked.len(), 6);
    assert_well_formed(&ranked, &seeds);
    let grumpier = ranked.iter().find(|m| m.movie_id == 3).unwrap();
    assert_eq!(grumpier.score, 4.0);
}

#[test]
fn test_pipeline_is_deterministic() {
    let (catalog, pipeline) = create_test_setup();
    let content = ContentRecommender::new(Arc::new(MetadataIndex::build(&catalog)));
    let seeds = SeedSet::new([3, 4, 7]).unwrap();

    let first = run(&content, &pipeline, &seeds, 5);
    for _ in 0..5 {
        assert_eq!(run(&content, &pipeline, &seeds, 5), first);
    }
}
