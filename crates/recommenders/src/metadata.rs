//! Metadata Index - TF-IDF term vectors per movie
//!
//! Each movie becomes a bag of terms:
//! - every genre, cast member, director and plot keyword is one term
//!   (lowercased, whitespace removed, so "Tom Hanks" -> "tomhanks")
//! - every tag is split into lowercase words, and every occurrence counts
//!
//! Weights are `tf * idf` with `idf = ln((1 + N) / (1 + df)) + 1`, then the
//! vector is scaled to unit length so cosine similarity is a dot product.

use data_loader::{Catalog, CategoryField, Movie, MovieId};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, instrument};

/// Index of a term in the vocabulary
pub type TermId = u32;

/// Sparse, unit-length (or all-zero) weighted term vector for one movie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataVector {
    /// (term, weight) pairs sorted by term id
    entries: Vec<(TermId, f32)>,
}

impl MetadataVector {
    /// Build from raw weights; the result is sorted and L2-normalised.
    pub fn from_weights(weights: impl IntoIterator<Item = (TermId, f32)>) -> Self {
        let mut entries: Vec<(TermId, f32)> = weights
            .into_iter()
            .filter(|(_, w)| *w > 0.0 && w.is_finite())
            .collect();
        entries.sort_unstable_by_key(|(term, _)| *term);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        Self { entries }
    }

    /// True when the movie had no terms at all
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(TermId, f32)] {
        &self.entries
    }

    pub fn weight(&self, term: TermId) -> f32 {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0.0)
    }

    /// Cosine similarity in [0, 1]; zero vectors are similar to nothing.
    pub fn cosine(&self, other: &MetadataVector) -> f32 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }

        // Both sides are sorted by term id: merge-join
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }
}

/// Normalise a categorical value into a single term
///
/// Example: "Tom Hanks" -> "tomhanks"
pub fn normalize_term(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split free-text tag into lowercase alphanumeric words
///
/// Example: "Pixar animation!" -> ["pixar", "animation"]
pub fn tag_words(tag: &str) -> impl Iterator<Item = String> + '_ {
    tag.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Term frequencies of one movie's metadata document
fn movie_terms(catalog: &Catalog, movie: &Movie) -> HashMap<String, u32> {
    let mut terms: HashMap<String, u32> = HashMap::new();
    for field in CategoryField::ALL {
        for value in field.values(movie) {
            let term = normalize_term(value);
            if !term.is_empty() {
                *terms.entry(term).or_insert(0) += 1;
            }
        }
    }
    for tag in catalog.tags_for(movie.id) {
        for word in tag_words(&tag.tag) {
            *terms.entry(word).or_insert(0) += 1;
        }
    }
    terms
}

/// TF-IDF vectors for every movie in the catalog, built once.
#[derive(Debug)]
pub struct MetadataIndex {
    vectors: BTreeMap<MovieId, MetadataVector>,
    vocabulary: HashMap<String, TermId>,
}

impl MetadataIndex {
    /// Build vectors for every movie, with document frequencies taken over
    /// the whole catalog.
    #[instrument(skip(catalog), fields(movies = catalog.len()))]
    pub fn build(catalog: &Catalog) -> Self {
        let movies: Vec<&Movie> = catalog.movies().collect();

        // Step 1: Term frequencies per movie
        let documents: Vec<(MovieId, HashMap<String, u32>)> = movies
            .par_iter()
            .map(|movie| (movie.id, movie_terms(catalog, movie)))
            .collect();

        // Step 2: Vocabulary in sorted order, so term ids are reproducible
        let terms: BTreeSet<&str> = documents
            .iter()
            .flat_map(|(_, doc)| doc.keys().map(String::as_str))
            .collect();
        let vocabulary: HashMap<String, TermId> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx as TermId))
            .collect();

        let mut document_frequency = vec![0u32; vocabulary.len()];
        for (_, doc) in &documents {
            for term in doc.keys() {
                document_frequency[vocabulary[term] as usize] += 1;
            }
        }

        // Step 3: Weight and normalise
        let n = documents.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let vectors: BTreeMap<MovieId, MetadataVector> = documents
            .par_iter()
            .map(|(movie_id, doc)| {
                let weights = doc.iter().map(|(term, &tf)| {
                    let term_id = vocabulary[term];
                    (term_id, tf as f32 * idf[term_id as usize])
                });
                (*movie_id, MetadataVector::from_weights(weights))
            })
            .collect();

        let empty = vectors.values().filter(|v| v.is_zero()).count();
        if empty > 0 {
            debug!("{} movies have no metadata terms", empty);
        }
        info!(
            "Built metadata index: {} movies, {} terms",
            vectors.len(),
            vocabulary.len()
        );

        Self {
            vectors,
            vocabulary,
        }
    }

    pub fn vector_of(&self, movie_id: MovieId) -> Option<&MetadataVector> {
        self.vectors.get(&movie_id)
    }

    /// Whether the movie has any metadata terms
    pub fn has_signal(&self, movie_id: MovieId) -> bool {
        self.vectors
            .get(&movie_id)
            .is_some_and(|vector| !vector.is_zero())
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.vocabulary.get(term).copied()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Every (movie, vector) pair in ascending movie id order
    pub fn iter(&self) -> impl Iterator<Item = (MovieId, &MetadataVector)> {
        self.vectors.iter().map(|(id, vector)| (*id, vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CatalogBuilder, MovieMetadata, Tag};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn create_test_catalog() -> Catalog {
        let mut builder = CatalogBuilder::new();
        builder
            .insert_movie(Movie::new(1, "Toy Story (1995)", strings(&["Animation", "Comedy"])))
            .insert_movie(Movie::new(2, "Toy Story Again (1995)", strings(&["Animation", "Comedy"])))
            .insert_movie(Movie::new(3, "Heat (1995)", strings(&["Crime"])))
            .insert_movie(Movie::new(4, "Untitled", vec![]))
            .insert_metadata(MovieMetadata {
                movie_id: 1,
                cast: strings(&["Tom Hanks"]),
                director: Some("John Lasseter".to_string()),
                plot_keywords: strings(&["toy"]),
                runtime: None,
            })
            .insert_metadata(MovieMetadata {
                movie_id: 2,
                cast: strings(&["Tom Hanks"]),
                director: Some("John Lasseter".to_string()),
                plot_keywords: strings(&["toy"]),
                runtime: None,
            })
            .insert_tag(Tag {
                user_id: 1,
                movie_id: 3,
                tag: "bank heist".to_string(),
                timestamp: 0,
            })
            .insert_tag(Tag {
                user_id: 2,
                movie_id: 3,
                tag: "Heist!".to_string(),
                timestamp: 0,
            });
        builder.build().unwrap()
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("Tom Hanks"), "tomhanks");
        assert_eq!(normalize_term("Sci-Fi"), "sci-fi");
        assert_eq!(normalize_term("  "), "");
    }

    #[test]
    fn test_tag_words() {
        let words: Vec<String> = tag_words("Pixar animation!").collect();
        assert_eq!(words, vec!["pixar", "animation"]);
    }

    #[test]
    fn test_identical_metadata_scores_one() {
        let index = MetadataIndex::build(&create_test_catalog());
        let a = index.vector_of(1).unwrap();
        let b = index.vector_of(2).unwrap();

        assert!((a.cosine(b) - 1.0).abs() < 1e-6);
        assert!((a.cosine(a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_metadata_scores_zero() {
        let index = MetadataIndex::build(&create_test_catalog());
        let toy = index.vector_of(1).unwrap();
        let heat = index.vector_of(3).unwrap();
        assert_eq!(toy.cosine(heat), 0.0);
    }

    #[test]
    fn test_tag_frequency_weighting() {
        let index = MetadataIndex::build(&create_test_catalog());
        let heat = index.vector_of(3).unwrap();

        let heist = index.term_id("heist").unwrap();
        let bank = index.term_id("bank").unwrap();
        // "heist" appears twice, "bank" once, and both only in movie 3
        assert!(heat.weight(heist) > heat.weight(bank));
    }

    #[test]
    fn test_movie_without_metadata_is_zero() {
        let index = MetadataIndex::build(&create_test_catalog());
        let untitled = index.vector_of(4).unwrap();

        assert!(untitled.is_zero());
        assert!(!index.has_signal(4));
        assert!(index.has_signal(1));
        assert_eq!(untitled.cosine(index.vector_of(1).unwrap()), 0.0);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let index = MetadataIndex::build(&create_test_catalog());
        for (_, vector) in index.iter().filter(|(_, v)| !v.is_zero()) {
            let norm: f32 = vector.entries().iter().map(|(_, w)| w * w).sum();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_terms_weighted_only_where_present() {
        let index = MetadataIndex::build(&create_test_catalog());
        let toy = index.vector_of(1).unwrap();

        let comedy = index.term_id("comedy").unwrap();
        let heat = index.vector_of(3).unwrap();
        let crime = index.term_id("crime").unwrap();
        assert!(heat.weight(crime) > 0.0);
        assert!(toy.weight(comedy) > 0.0);
        assert_eq!(toy.weight(crime), 0.0);
    }
}
