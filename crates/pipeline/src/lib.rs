//! Post-scoring pipeline for seed-based recommendations.
//!
//! This crate provides:
//! - Filter trait and implementations for removing unwanted scored movies
//! - FilterPipeline for composing filters
//! - Deterministic ranking (dedupe, sort, tie-break, truncate)
//!
//! ## Architecture
//! A strategy's score map is processed in stages:
//! 1. Filters remove seeds, invalid scores and unknown ids
//! 2. `rank` orders by score descending, ties by ascending id
//! 3. The caller maps the surviving ids back to titles
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::filters::*;
//! use pipeline::{FilterPipeline, rank};
//! use recommenders::ScoredMovie;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(NonFiniteScoreFilter)
//!     .add_filter(CatalogMembershipFilter::new(catalog.clone()))
//!     .add_filter(SeedExclusionFilter);
//!
//! let filtered = pipeline.apply(ScoredMovie::from_scores(scores), &seeds);
//! let top = rank(filtered, 10);
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod ranking;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use ranking::rank;
pub use traits::Filter;
