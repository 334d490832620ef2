//! Engine crate for the ReelRecs recommender.
//!
//! Ties the catalog, both strategies and the post-scoring pipeline into
//! one [`RecommendationOrchestrator`], and exposes it process-wide.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{EngineConfig, content_model};
//! use std::path::Path;
//!
//! engine::init(Path::new("resources/data"), &EngineConfig::default())?;
//! let titles = content_model(&["Toy Story (1995)", "Jumanji (1995)", "Heat (1995)"], 10)?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod startup;

pub use api::{collab_model, content_model};
pub use config::{CollaborativeConfig, EngineConfig};
pub use error::{RecommendationError, Result};
pub use orchestrator::{Recommendation, RecommendationOrchestrator, SEED_COUNT, Strategy};
pub use startup::{global, init, init_with, install, is_initialized};
