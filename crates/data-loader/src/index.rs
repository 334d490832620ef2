//! Catalog building and indexing logic.
//!
//! - Parse the four tables in parallel
//! - Attach auxiliary metadata to movies
//! - Build title, rating and tag indices
//! - Compute per-movie statistics
//! - Validate every reference before the catalog is handed out

use crate::error::{CatalogLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Locations of the four catalog tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub movies: PathBuf,
    pub metadata: PathBuf,
    pub tags: PathBuf,
    pub ratings: PathBuf,
}

impl CatalogPaths {
    /// Standard file names inside a data directory
    pub fn from_dir(data_dir: &Path) -> Self {
        Self {
            movies: data_dir.join("movies.csv"),
            metadata: data_dir.join("imdb_data.csv"),
            tags: data_dir.join("tags.csv"),
            ratings: data_dir.join("ratings.csv"),
        }
    }
}

/// Collects parsed rows and turns them into an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    movies: Vec<Movie>,
    metadata: Vec<MovieMetadata>,
    tags: Vec<Tag>,
    ratings: Vec<Rating>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_movie(&mut self, movie: Movie) -> &mut Self {
        self.movies.push(movie);
        self
    }

    pub fn insert_metadata(&mut self, metadata: MovieMetadata) -> &mut Self {
        self.metadata.push(metadata);
        self
    }

    pub fn insert_tag(&mut self, tag: Tag) -> &mut Self {
        self.tags.push(tag);
        self
    }

    pub fn insert_rating(&mut self, rating: Rating) -> &mut Self {
        self.ratings.push(rating);
        self
    }

    /// Validate and index everything collected so far.
    pub fn build(self) -> Result<Catalog> {
        let mut movies: BTreeMap<MovieId, Movie> = BTreeMap::new();
        for movie in self.movies {
            let id = movie.id;
            if movies.insert(id, movie).is_some() {
                return Err(CatalogLoadError::DuplicateMovie(id));
            }
        }

        let mut skipped_metadata = 0usize;
        for metadata in self.metadata {
            match movies.remove(&metadata.movie_id) {
                Some(movie) => {
                    movies.insert(metadata.movie_id, movie.with_metadata(metadata));
                }
                None => skipped_metadata += 1,
            }
        }
        if skipped_metadata > 0 {
            warn!(
                "Skipped {} metadata rows for movies not in the catalog",
                skipped_metadata
            );
        }

        // Ascending id order, so shared titles resolve to the lowest id
        let mut title_index: HashMap<String, MovieId> = HashMap::new();
        for (id, movie) in &movies {
            title_index.entry(movie.title.clone()).or_insert(*id);
        }

        let mut movie_tags: HashMap<MovieId, Vec<Tag>> = HashMap::new();
        for tag in self.tags {
            if !movies.contains_key(&tag.movie_id) {
                return Err(CatalogLoadError::MissingReference {
                    entity: "Movie".to_string(),
                    id: tag.movie_id,
                });
            }
            movie_tags.entry(tag.movie_id).or_default().push(tag);
        }

        let mut user_ratings: BTreeMap<UserId, Vec<Rating>> = BTreeMap::new();
        for rating in self.ratings {
            validate_rating(&rating, &movies)?;
            user_ratings.entry(rating.user_id).or_default().push(rating);
        }

        // One rating per (user, movie): the most recent one wins
        let mut duplicates = 0usize;
        for ratings in user_ratings.values_mut() {
            ratings.sort_by(|a, b| {
                a.movie_id
                    .cmp(&b.movie_id)
                    .then_with(|| b.timestamp.cmp(&a.timestamp))
            });
            let before = ratings.len();
            ratings.dedup_by_key(|r| r.movie_id);
            duplicates += before - ratings.len();
        }
        if duplicates > 0 {
            debug!("Dropped {} superseded duplicate ratings", duplicates);
        }

        // Users are visited in ascending order, so each list ends up sorted by user
        let mut movie_ratings: HashMap<MovieId, Vec<Rating>> = HashMap::new();
        for ratings in user_ratings.values() {
            for rating in ratings {
                movie_ratings.entry(rating.movie_id).or_default().push(*rating);
            }
        }

        let mut catalog = Catalog {
            movies,
            title_index,
            user_ratings,
            movie_ratings,
            movie_tags,
            movie_stats: HashMap::new(),
        };
        catalog.compute_movie_stats();
        Ok(catalog)
    }
}

fn validate_rating(rating: &Rating, movies: &BTreeMap<MovieId, Movie>) -> Result<()> {
    if !movies.contains_key(&rating.movie_id) {
        return Err(CatalogLoadError::MissingReference {
            entity: "Movie".to_string(),
            id: rating.movie_id,
        });
    }
    if !(RATING_MIN..=RATING_MAX).contains(&rating.rating) {
        return Err(CatalogLoadError::InvalidValue {
            field: "rating".to_string(),
            value: rating.rating.to_string(),
        });
    }
    Ok(())
}

impl Catalog {
    /// Load the catalog from its four CSV tables.
    ///
    /// The tables are parsed in parallel, then indexed and validated.
    pub fn load(paths: &CatalogPaths) -> Result<Self> {
        info!("Loading catalog from {:?}", paths.movies.parent());

        let ((movies, metadata), (tags, ratings)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&paths.movies),
                    || parser::parse_metadata(&paths.metadata),
                )
            },
            || {
                rayon::join(
                    || parser::parse_tags(&paths.tags),
                    || parser::parse_ratings(&paths.ratings),
                )
            },
        );

        let movies = movies?;
        let metadata = metadata?;
        let tags = tags?;
        let ratings = ratings?;

        info!(
            "Parsed {} movies, {} metadata rows, {} tags, {} ratings",
            movies.len(),
            metadata.len(),
            tags.len(),
            ratings.len()
        );

        let mut builder = CatalogBuilder::new();
        for movie in movies {
            builder.insert_movie(movie);
        }
        for row in metadata {
            builder.insert_metadata(row);
        }
        for tag in tags {
            builder.insert_tag(tag);
        }
        for rating in ratings {
            builder.insert_rating(rating);
        }

        let catalog = builder.build()?;
        let counts = catalog.counts();
        info!(
            movies = counts.movies,
            users = counts.users,
            ratings = counts.ratings,
            tags = counts.tags,
            "Catalog built and validated"
        );
        Ok(catalog)
    }

    /// Compute average rating and rating count for every rated movie
    fn compute_movie_stats(&mut self) {
        self.movie_stats = self
            .movie_ratings
            .par_iter()
            .map(|(&movie_id, ratings)| {
                let rating_count = ratings.len() as u32;
                let total: f32 = ratings.iter().map(|r| r.rating).sum();
                let avg_rating = if rating_count > 0 {
                    total / rating_count as f32
                } else {
                    0.0
                };
                (
                    movie_id,
                    MovieStats {
                        avg_rating,
                        rating_count,
                    },
                )
            })
            .collect();
    }

    /// How many times each value of a category field occurs across the catalog.
    ///
    /// Sorted by count descending, then value ascending.
    pub fn value_counts(&self, field: CategoryField) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for movie in self.movies.values() {
            for value in field.values(movie) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Case-insensitive title search: exact matches first, then substrings,
    /// each group in ascending id order.
    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<&Movie> {
        let query = query.to_lowercase();
        let mut matches: Vec<(u8, &Movie)> = self
            .movies
            .values()
            .filter_map(|movie| {
                let title = movie.title.to_lowercase();
                if title == query {
                    Some((0, movie))
                } else if title.contains(&query) {
                    Some((1, movie))
                } else {
                    None
                }
            })
            .collect();
        matches.sort_by_key(|(rank, movie)| (*rank, movie.id));
        matches.truncate(limit);
        matches.into_iter().map(|(_, movie)| movie).collect()
    }
}
