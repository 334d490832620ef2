//! Error types for the recommender strategies.

use data_loader::MovieId;
use thiserror::Error;

/// Failures raised while scoring or training.
///
/// All of these are deterministic for a given catalog and seed set, so
/// callers surface them rather than retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// A seed carries no usable metadata or rating signal
    #[error("Insufficient data: {reason}")]
    InsufficientData { reason: String },

    /// The same movie was supplied twice as a seed
    #[error("Movie {0} appears more than once in the seed set")]
    DuplicateSeed(MovieId),

    /// A seed id that is not in the catalog
    #[error("Movie {0} is not in the catalog")]
    UnknownMovie(MovieId),

    /// Factorization could not run with the given data or configuration
    #[error("Latent factor training failed: {0}")]
    Training(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
