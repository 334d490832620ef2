//! Process-wide engine, built at most once.
//!
//! Building the engine trains the latent factors, which is the only slow
//! step in the system. The first caller of [`init`] (or [`install`]) builds
//! it under a mutex; concurrent callers wait and then share the result.
//! Requests made through [`global`] before that fail with `ModelUnavailable`.

use crate::config::EngineConfig;
use crate::error::{RecommendationError, Result};
use crate::orchestrator::RecommendationOrchestrator;
use data_loader::{Catalog, CatalogPaths};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::info;

static ENGINE: OnceLock<Arc<RecommendationOrchestrator>> = OnceLock::new();

/// Held for the whole build
static INIT_GUARD: Mutex<()> = Mutex::new(());

/// Load the catalog from `data_dir` and build the global engine
///
/// Returns the existing engine if one is already installed; the catalog is
/// not reloaded.
pub fn init(data_dir: &Path, config: &EngineConfig) -> Result<Arc<RecommendationOrchestrator>> {
    init_with(|| {
        info!("Loading catalog from {}", data_dir.display());
        let catalog = Arc::new(Catalog::load(&CatalogPaths::from_dir(data_dir))?);
        RecommendationOrchestrator::build(catalog, config)
    })
}

/// Install an already built engine as the global one
///
/// If an engine is already installed it is kept and returned.
pub fn install(orchestrator: RecommendationOrchestrator) -> Arc<RecommendationOrchestrator> {
    let _guard = INIT_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
    ENGINE.get_or_init(|| Arc::new(orchestrator)).clone()
}

/// Build the global engine with `build` unless one is already installed
///
/// `build` runs at most once across all callers. If it fails, nothing is
/// installed and a later call may try again.
pub fn init_with(
    build: impl FnOnce() -> Result<RecommendationOrchestrator>,
) -> Result<Arc<RecommendationOrchestrator>> {
    if let Some(engine) = ENGINE.get() {
        return Ok(engine.clone());
    }

    let _guard = INIT_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
    // Another caller may have finished while we waited
    if let Some(engine) = ENGINE.get() {
        return Ok(engine.clone());
    }

    let engine = Arc::new(build()?);
    Ok(ENGINE.get_or_init(|| engine).clone())
}

/// The global engine, if it has been built
pub fn global() -> Result<Arc<RecommendationOrchestrator>> {
    ENGINE
        .get()
        .cloned()
        .ok_or_else(|| RecommendationError::ModelUnavailable {
            reason: "the engine has not been initialised".to_string(),
        })
}

pub fn is_initialized() -> bool {
    ENGINE.get().is_some()
}
