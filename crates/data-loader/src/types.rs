//! Core domain types for the movie catalog.
//!
//! The catalog is built once and never mutated afterwards, so everything
//! here is plain data. Multi-valued metadata (genres, cast, keywords) is
//! kept as the list of values parsed from the pipe-delimited source columns.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Lowest rating a user can give
pub const RATING_MIN: f32 = 0.5;

/// Highest rating a user can give
pub const RATING_MAX: f32 = 5.0;

// =============================================================================
// Movie-related Types
// =============================================================================

/// A movie and the metadata the recommenders read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Display title, e.g. "Toy Story (1995)". Not unique across the catalog.
    pub title: String,
    /// Year extracted from the title, if it ends in "(YYYY)"
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub plot_keywords: Vec<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
}

impl Movie {
    /// Create a movie with a title and genres and no auxiliary metadata.
    pub fn new(id: MovieId, title: impl Into<String>, genres: Vec<String>) -> Self {
        let title = title.into();
        Self {
            id,
            year: crate::parser::extract_year_from_title(&title),
            title,
            genres,
            cast: Vec::new(),
            director: None,
            plot_keywords: Vec::new(),
            runtime: None,
        }
    }

    /// Attach auxiliary metadata parsed from the metadata table.
    pub fn with_metadata(mut self, metadata: MovieMetadata) -> Self {
        self.cast = metadata.cast;
        self.director = metadata.director;
        self.plot_keywords = metadata.plot_keywords;
        self.runtime = metadata.runtime;
        self
    }
}

/// One row of the auxiliary metadata table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieMetadata {
    pub movie_id: MovieId,
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub plot_keywords: Vec<String>,
    pub runtime: Option<u32>,
}

/// The multi-valued categorical fields of a movie.
///
/// Every "split a pipe-delimited column into values" use goes through here:
/// the metadata tokenizer and the catalog's value counts both iterate these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryField {
    Genres,
    Cast,
    Director,
    PlotKeywords,
}

impl CategoryField {
    pub const ALL: [CategoryField; 4] = [
        CategoryField::Genres,
        CategoryField::Cast,
        CategoryField::Director,
        CategoryField::PlotKeywords,
    ];

    /// Values of this field for one movie
    pub fn values<'a>(&self, movie: &'a Movie) -> Vec<&'a str> {
        match self {
            CategoryField::Genres => movie.genres.iter().map(String::as_str).collect(),
            CategoryField::Cast => movie.cast.iter().map(String::as_str).collect(),
            CategoryField::Director => movie.director.as_deref().into_iter().collect(),
            CategoryField::PlotKeywords => {
                movie.plot_keywords.iter().map(String::as_str).collect()
            }
        }
    }

    /// Column name in the source tables
    pub fn column_name(&self) -> &'static str {
        match self {
            CategoryField::Genres => "genres",
            CategoryField::Cast => "title_cast",
            CategoryField::Director => "director",
            CategoryField::PlotKeywords => "plot_keywords",
        }
    }
}

// =============================================================================
// User annotations
// =============================================================================

/// Free-text tag a user attached to a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub tag: String,
    pub timestamp: i64,
}

/// A single rating from a user for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0
    pub rating: f32,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Precomputed statistics for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: f32,
    pub rating_count: u32,
}

/// Sizes of the loaded tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub movies: usize,
    pub users: usize,
    pub ratings: usize,
    pub tags: usize,
}

// =============================================================================
// Catalog - The Core In-Memory Database
// =============================================================================

/// Immutable in-memory catalog of movies, metadata, tags and ratings.
///
/// Built through [`CatalogBuilder`](crate::CatalogBuilder) or
/// [`Catalog::load`]; there are no mutators. Movies are kept in a `BTreeMap`
/// so iteration is always in ascending id order.
#[derive(Debug)]
pub struct Catalog {
    pub(crate) movies: BTreeMap<MovieId, Movie>,

    /// Exact title -> lowest movie id carrying that title
    pub(crate) title_index: HashMap<String, MovieId>,

    /// All ratings made by each user, sorted by movie id
    pub(crate) user_ratings: BTreeMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie, sorted by user id
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    pub(crate) movie_tags: HashMap<MovieId, Vec<Tag>>,

    pub(crate) movie_stats: HashMap<MovieId, MovieStats>,
}

impl Catalog {
    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get a movie by ID, failing with `MovieNotFound`
    pub fn movie(&self, id: MovieId) -> std::result::Result<&Movie, crate::LookupError> {
        self.movies
            .get(&id)
            .ok_or(crate::LookupError::MovieNotFound(id))
    }

    /// Resolve an exact title to its movie id.
    ///
    /// Titles are not unique; a shared title always resolves to the lowest id.
    pub fn resolve_title(&self, title: &str) -> std::result::Result<MovieId, crate::LookupError> {
        self.title_index
            .get(title)
            .copied()
            .ok_or_else(|| crate::LookupError::TitleNotFound(title.to_string()))
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.movies.contains_key(&id)
    }

    /// All movies in ascending id order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// All movie ids in ascending order
    pub fn movie_ids(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.movies.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Get all ratings made by a user, sorted by movie id
    pub fn user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie, sorted by user id
    pub fn movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The rating a user gave a movie, if any
    pub fn rating(&self, user_id: UserId, movie_id: MovieId) -> Option<f32> {
        let ratings = self.user_ratings(user_id);
        ratings
            .binary_search_by_key(&movie_id, |r| r.movie_id)
            .ok()
            .map(|idx| ratings[idx].rating)
    }

    /// Every user with at least one rating, ascending
    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.user_ratings.keys().copied()
    }

    /// Get all tags attached to a movie
    pub fn tags_for(&self, movie_id: MovieId) -> &[Tag] {
        self.movie_tags
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get precomputed statistics for a movie
    pub fn movie_stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.movie_stats.get(&movie_id)
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            movies: self.movies.len(),
            users: self.user_ratings.len(),
            ratings: self.user_ratings.values().map(|v| v.len()).sum(),
            tags: self.movie_tags.values().map(|v| v.len()).sum(),
        }
    }
}
