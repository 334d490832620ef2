//! Parsers for the catalog CSV files.
//!
//! - movies.csv: movieId,title,genres
//! - imdb_data.csv: movieId,title_cast,director,runtime,budget,plot_keywords
//! - tags.csv: userId,movieId,tag,timestamp
//! - ratings.csv: userId,movieId,rating,timestamp
//!
//! Multi-valued columns are pipe-delimited. Every file has a header row and
//! may quote fields (titles routinely contain commas).

use crate::error::{CatalogLoadError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Placeholder MovieLens uses for a movie without genres
const NO_GENRES: &str = "(no genres listed)";

#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: Option<String>,
    genres: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    #[serde(default)]
    title_cast: Option<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    runtime: Option<f32>,
    #[serde(default)]
    plot_keywords: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    tag: Option<String>,
    #[serde(default)]
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
    timestamp: i64,
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read every record of a headered CSV file, keeping its line number
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<(u64, T)>> {
    let file_name = file_label(path);
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogLoadError::IoError(e),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let headers = reader
        .headers()
        .map_err(|source| CatalogLoadError::Csv {
            file: file_name.clone(),
            source,
        })?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| CatalogLoadError::Csv {
            file: file_name.clone(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| CatalogLoadError::ParseError {
                file: file_name.clone(),
                line,
                reason: e.to_string(),
            })?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Split a pipe-delimited column into trimmed, non-empty values
///
/// Example: "Adventure|Animation| Children" -> ["Adventure", "Animation", "Children"]
pub fn split_multi(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split the genres column; the "(no genres listed)" placeholder means none
fn split_genres(value: &str) -> Vec<String> {
    let mut genres = split_multi(value);
    genres.retain(|genre| genre != NO_GENRES);
    genres
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the movies table
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file_name = file_label(path);
    read_records::<MovieRecord>(path)?
        .into_iter()
        .map(|(line, record)| {
            let title = non_empty(record.title).ok_or_else(|| CatalogLoadError::MissingField {
                file: file_name.clone(),
                line,
                field: "title",
            })?;
            let genres = record.genres.as_deref().map(split_genres).unwrap_or_default();
            Ok(Movie::new(record.movie_id, title, genres))
        })
        .collect()
}

/// Parse the auxiliary metadata table (cast, director, runtime, keywords)
pub fn parse_metadata(path: &Path) -> Result<Vec<MovieMetadata>> {
    let rows = read_records::<MetadataRecord>(path)?;
    Ok(rows
        .into_iter()
        .map(|(_, record)| MovieMetadata {
            movie_id: record.movie_id,
            cast: record.title_cast.as_deref().map(split_multi).unwrap_or_default(),
            director: non_empty(record.director).map(|d| d.trim().to_string()),
            plot_keywords: record
                .plot_keywords
                .as_deref()
                .map(split_multi)
                .unwrap_or_default(),
            runtime: record
                .runtime
                .filter(|r| r.is_finite() && *r > 0.0)
                .map(|r| r.round() as u32),
        })
        .collect())
}

/// Parse the tags table. Rows with an empty tag are skipped.
pub fn parse_tags(path: &Path) -> Result<Vec<Tag>> {
    let rows = read_records::<TagRecord>(path)?;
    Ok(rows
        .into_iter()
        .filter_map(|(_, record)| {
            let tag = non_empty(record.tag)?;
            Some(Tag {
                user_id: record.user_id,
                movie_id: record.movie_id,
                tag,
                timestamp: record.timestamp,
            })
        })
        .collect())
}

/// Parse the ratings table
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file_name = file_label(path);
    read_records::<RatingRecord>(path)?
        .into_iter()
        .map(|(line, record)| {
            if !record.rating.is_finite() {
                return Err(CatalogLoadError::ParseError {
                    file: file_name.clone(),
                    line,
                    reason: format!("Invalid rating: {}", record.rating),
                });
            }
            Ok(Rating {
                user_id: record.user_id,
                movie_id: record.movie_id,
                rating: record.rating,
                timestamp: record.timestamp,
            })
        })
        .collect()
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
pub(crate) fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        let year_str = &title[start + 1..end];
        if let Ok(year) = year_str.trim().parse::<u16>() {
            return Some(year);
        }
    }
    None
}
