//! Filter implementations for the scoring pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod catalog_membership;
pub mod non_finite_score;
pub mod seed_exclusion;

// Re-export for convenience
pub use catalog_membership::CatalogMembershipFilter;
pub use non_finite_score::NonFiniteScoreFilter;
pub use seed_exclusion::SeedExclusionFilter;
