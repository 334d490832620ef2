//! # Data Loader Crate
//!
//! Loads the movie catalog (movies, auxiliary metadata, tags, ratings) from
//! CSV and exposes it as an immutable, read-only [`Catalog`].
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Tag, Rating, Catalog)
//! - **parser**: Parse the CSV tables into Rust structs
//! - **index**: Build, index and validate the catalog
//! - **error**: Error types for loading and lookups
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Catalog, CatalogPaths};
//! use std::path::Path;
//!
//! let catalog = Catalog::load(&CatalogPaths::from_dir(Path::new("resources/data")))?;
//! let id = catalog.resolve_title("Toy Story (1995)")?;
//! let movie = catalog.get_movie(id).unwrap();
//! println!("{} has {} ratings", movie.title, catalog.movie_ratings(id).len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use error::{CatalogLoadError, LookupError, Result};
pub use index::{CatalogBuilder, CatalogPaths};
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    Catalog,
    CatalogCounts,
    CategoryField,
    Movie,
    MovieMetadata,
    MovieStats,
    Rating,
    Tag,
    // Rating bounds
    RATING_MAX,
    RATING_MIN,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog() {
        let catalog = CatalogBuilder::new().build().unwrap();
        let counts = catalog.counts();

        assert_eq!(counts.movies, 0);
        assert_eq!(counts.users, 0);
        assert_eq!(counts.ratings, 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_empty_queries() {
        let catalog = CatalogBuilder::new().build().unwrap();

        assert!(catalog.get_movie(999).is_none());
        assert_eq!(catalog.movie(999).unwrap_err(), LookupError::MovieNotFound(999));
        assert!(catalog.user_ratings(999).is_empty());
        assert!(catalog.movie_ratings(999).is_empty());
        assert!(catalog.tags_for(999).is_empty());
    }

    #[test]
    fn test_category_field_values() {
        let movie = Movie::new(1, "Toy Story (1995)", vec!["Comedy".to_string()]).with_metadata(
            MovieMetadata {
                movie_id: 1,
                cast: vec!["Tom Hanks".to_string(), "Tim Allen".to_string()],
                director: Some("John Lasseter".to_string()),
                plot_keywords: vec![],
                runtime: None,
            },
        );

        assert_eq!(CategoryField::Genres.values(&movie), vec!["Comedy"]);
        assert_eq!(CategoryField::Cast.values(&movie), vec!["Tom Hanks", "Tim Allen"]);
        assert_eq!(CategoryField::Director.values(&movie), vec!["John Lasseter"]);
        assert!(CategoryField::PlotKeywords.values(&movie).is_empty());
        assert_eq!(movie.year, Some(1995));
    }
}
