//! Errors surfaced to callers of the engine.

use data_loader::{CatalogLoadError, LookupError, MovieId};
use recommenders::RecommendError;
use thiserror::Error;

/// Every failure a recommendation request or engine startup can produce.
///
/// An empty or short result is not an error; each variant here is a
/// distinct, named failure.
#[derive(Error, Debug)]
pub enum RecommendationError {
    /// A seed title is not in the catalog
    #[error("Title not found: {title:?}")]
    TitleNotFound { title: String },

    #[error("Expected exactly 3 seed titles, got {got}")]
    InvalidSeedCount { got: usize },

    /// The same movie was named twice
    #[error("Seed {title:?} appears more than once")]
    DuplicateSeed { title: String },

    #[error("top_n must be at least 1, got {top_n}")]
    InvalidTopN { top_n: usize },

    /// The seeds carry no usable metadata or rating signal
    #[error("Insufficient data: {reason}")]
    InsufficientData { reason: String },

    /// The engine (or the requested model) has not been built
    #[error("Model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Movie {0} is not in the catalog")]
    UnknownMovie(MovieId),

    #[error("Latent factor training failed: {0}")]
    Training(String),

    #[error("Failed to load catalog: {0}")]
    CatalogLoad(#[from] CatalogLoadError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<RecommendError> for RecommendationError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InsufficientData { reason } => Self::InsufficientData { reason },
            RecommendError::DuplicateSeed(id) => Self::DuplicateSeed {
                title: format!("movie {}", id),
            },
            RecommendError::UnknownMovie(id) => Self::UnknownMovie(id),
            RecommendError::Training(reason) => Self::Training(reason),
        }
    }
}

impl From<LookupError> for RecommendationError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::TitleNotFound(title) => Self::TitleNotFound { title },
            LookupError::MovieNotFound(id) => Self::UnknownMovie(id),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_not_found_names_title() {
        let err: RecommendationError = LookupError::TitleNotFound("Nope (2001)".to_string()).into();
        assert!(matches!(&err, RecommendationError::TitleNotFound { title } if title == "Nope (2001)"));
        assert!(err.to_string().contains("Nope (2001)"));
    }

    #[test]
    fn test_recommend_errors_map_by_kind() {
        let err: RecommendationError = RecommendError::InsufficientData {
            reason: "no neighbours".to_string(),
        }
        .into();
        assert!(matches!(err, RecommendationError::InsufficientData { .. }));

        let err: RecommendationError = RecommendError::UnknownMovie(7).into();
        assert!(matches!(err, RecommendationError::UnknownMovie(7)));
    }
}
