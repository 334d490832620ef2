//! Latent Factor Model - ALS factorization of the rating matrix
//!
//! Learns a `k`-dimensional embedding for every user and movie so that the
//! dot product approximates the observed ratings:
//!
//! ```text
//! minimise  Σ (r_um − p_u·q_m)² + λ(‖p_u‖² + ‖q_m‖²)
//! ```
//!
//! ## Algorithm (alternating least squares)
//! 1. Initialise every factor from a seeded RNG
//! 2. Fix movie factors, solve each user's normal equation
//!    `(QᵀQ + λI) p_u = Qᵀr_u` by Cholesky
//! 3. Fix user factors, solve each movie's equation the same way
//! 4. Repeat for the configured number of iterations
//!
//! Factors live in dense `Array2<f32>` matrices, one row per user or movie
//! in ascending id order. Only observed ratings enter the loss. Rows are
//! solved in parallel; each row only reads the other side's factors, so the
//! result does not depend on thread scheduling.

use crate::error::{RecommendError, Result};
use data_loader::{Catalog, MovieId, RATING_MAX, RATING_MIN, Rating, UserId};
use ndarray::{Array1, Array2, ArrayView1, s};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Hyper-parameters for the factorization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Embedding size `k`
    pub dimensions: usize,

    /// Number of full user+movie sweeps
    pub iterations: usize,

    /// L2 penalty `λ`
    pub regularization: f32,

    /// RNG seed for factor initialisation
    pub seed: u64,

    /// Minimum rating for a user to count as liking a movie
    pub high_rating_threshold: f32,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            dimensions: 20,
            iterations: 15,
            regularization: 0.1,
            seed: 42,
            high_rating_threshold: 4.0,
        }
    }
}

impl FactorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(RecommendError::Training(
                "dimensions must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(RecommendError::Training(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(RecommendError::Training(format!(
                "regularization must be positive, got {}",
                self.regularization
            )));
        }
        if !self.high_rating_threshold.is_finite() {
            return Err(RecommendError::Training(
                "high_rating_threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trained user and movie embeddings over a shared catalog.
pub struct LatentFactorModel {
    catalog: Arc<Catalog>,
    config: FactorConfig,

    /// User id -> row of `user_factors`
    user_rows: HashMap<UserId, usize>,

    /// Movie id -> row of `movie_factors`
    movie_rows: HashMap<MovieId, usize>,

    user_factors: Array2<f32>,

    /// Every catalog movie; unrated movies hold a zero row
    movie_factors: Array2<f32>,

    rmse: f32,
}

impl LatentFactorModel {
    /// Factorize the catalog's rating matrix
    ///
    /// Fails on an invalid configuration or when there are no ratings.
    #[instrument(skip(catalog, config), fields(k = config.dimensions, iterations = config.iterations))]
    pub fn train(catalog: Arc<Catalog>, config: &FactorConfig) -> Result<Self> {
        config.validate()?;

        let counts = catalog.counts();
        if counts.ratings == 0 {
            return Err(RecommendError::Training(
                "the catalog has no ratings".to_string(),
            ));
        }
        info!(
            "Training latent factors: {} users, {} movies, {} ratings",
            counts.users, counts.movies, counts.ratings
        );

        // Dense row indices, ascending id order
        let k = config.dimensions;
        let users: Vec<UserId> = catalog.user_ids().collect();
        let movies: Vec<MovieId> = catalog.movie_ids().collect();
        let user_rows: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(row, &id)| (id, row)).collect();
        let movie_rows: HashMap<MovieId, usize> =
            movies.iter().enumerate().map(|(row, &id)| (id, row)).collect();

        // Step 1: Seeded initialisation, users then rated movies
        let mut rng = StdRng::seed_from_u64(config.seed);
        let scale = 1.0 / (k as f32).sqrt();
        let mut user_factors = Array2::<f32>::zeros((users.len(), k));
        for mut row in user_factors.rows_mut() {
            row.mapv_inplace(|_| rng.random_range(0.0..1.0f32) * scale);
        }
        let mut movie_factors = Array2::<f32>::zeros((movies.len(), k));
        for (&movie_id, mut row) in movies.iter().zip(movie_factors.rows_mut()) {
            if !catalog.movie_ratings(movie_id).is_empty() {
                row.mapv_inplace(|_| rng.random_range(0.0..1.0f32) * scale);
            }
        }

        // Step 2: Alternate
        let mut rmse = f32::NAN;
        for iteration in 0..config.iterations {
            let solved: Vec<Array1<f32>> = users
                .par_iter()
                .map(|&user_id| {
                    solve_row(
                        catalog.user_ratings(user_id),
                        |r| movie_factors.row(movie_rows[&r.movie_id]),
                        config,
                    )
                })
                .collect::<Result<_>>()?;
            user_factors = stack_rows(&solved, k);

            let solved: Vec<Array1<f32>> = movies
                .par_iter()
                .map(|&movie_id| {
                    let ratings = catalog.movie_ratings(movie_id);
                    if ratings.is_empty() {
                        return Ok(Array1::zeros(k));
                    }
                    solve_row(ratings, |r| user_factors.row(user_rows[&r.user_id]), config)
                })
                .collect::<Result<_>>()?;
            movie_factors = stack_rows(&solved, k);

            rmse = training_error(&catalog, &users, &user_factors, &movie_factors, &movie_rows);
            debug!("ALS iteration {}: rmse = {:.4}", iteration + 1, rmse);
        }

        info!("Latent factors trained, rmse = {:.4}", rmse);

        Ok(Self {
            catalog,
            config: config.clone(),
            user_rows,
            movie_rows,
            user_factors,
            movie_factors,
            rmse,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &FactorConfig {
        &self.config
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Movie embedding; all zeros for movies nobody rated
    pub fn embedding_of(&self, movie_id: MovieId) -> Option<ArrayView1<'_, f32>> {
        let row = *self.movie_rows.get(&movie_id)?;
        Some(self.movie_factors.row(row))
    }

    pub fn user_embedding(&self, user_id: UserId) -> Option<ArrayView1<'_, f32>> {
        let row = *self.user_rows.get(&user_id)?;
        Some(self.user_factors.row(row))
    }

    /// Predicted rating, clamped to the rating range
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> Option<f32> {
        let user = self.user_embedding(user_id)?;
        let movie = self.embedding_of(movie_id)?;
        Some(user.dot(&movie).clamp(RATING_MIN, RATING_MAX))
    }

    /// Root mean squared error over the observed ratings after training
    pub fn training_rmse(&self) -> f32 {
        self.rmse
    }

    /// Users who rated **every** given movie at or above the threshold
    ///
    /// Ordered by the sum of those ratings (descending), then user id.
    pub fn similar_users(&self, movie_ids: &[MovieId], limit: usize) -> Vec<UserId> {
        self.rank_users(movie_ids, limit, movie_ids.len())
    }

    /// Users who rated **at least one** given movie at or above the threshold
    ///
    /// Ordered by how many of the movies they liked, then by the sum of
    /// those ratings (both descending), then user id.
    pub fn users_rating_any(&self, movie_ids: &[MovieId], limit: usize) -> Vec<UserId> {
        self.rank_users(movie_ids, limit, 1)
    }

    fn rank_users(&self, movie_ids: &[MovieId], limit: usize, min_liked: usize) -> Vec<UserId> {
        if movie_ids.is_empty() {
            return Vec::new();
        }

        // user -> (movies liked, sum of those ratings)
        let mut liked: HashMap<UserId, (usize, f32)> = HashMap::new();
        for &movie_id in movie_ids {
            for rating in self.catalog.movie_ratings(movie_id) {
                if rating.rating >= self.config.high_rating_threshold {
                    let entry = liked.entry(rating.user_id).or_insert((0, 0.0));
                    entry.0 += 1;
                    entry.1 += rating.rating;
                }
            }
        }

        let mut ranked: Vec<(UserId, usize, f32)> = liked
            .into_iter()
            .filter(|(_, (count, _))| *count >= min_liked)
            .map(|(user_id, (count, sum))| (user_id, count, sum))
            .collect();
        ranked.sort_unstable_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.2.total_cmp(&a.2))
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        ranked.into_iter().map(|(user_id, _, _)| user_id).collect()
    }
}

/// Gather solved rows into a factor matrix
fn stack_rows(rows: &[Array1<f32>], k: usize) -> Array2<f32> {
    let mut factors = Array2::<f32>::zeros((rows.len(), k));
    for (mut target, row) in factors.rows_mut().into_iter().zip(rows) {
        target.assign(row);
    }
    factors
}

/// Solve `(QᵀQ + λI) x = Qᵀr` for one user or movie
///
/// `Q` holds the other side's factors for every rating in `ratings`.
fn solve_row<'a>(
    ratings: &[Rating],
    factors_of: impl Fn(&Rating) -> ArrayView1<'a, f32>,
    config: &FactorConfig,
) -> Result<Array1<f32>> {
    let k = config.dimensions;
    let mut q = Array2::<f64>::zeros((ratings.len(), k));
    let mut r = Array1::<f64>::zeros(ratings.len());
    for (i, rating) in ratings.iter().enumerate() {
        q.row_mut(i).assign(&factors_of(rating).mapv(|x| x as f64));
        r[i] = rating.rating as f64;
    }

    let gram = q.t().dot(&q) + Array2::<f64>::eye(k) * config.regularization as f64;
    let rhs = q.t().dot(&r);

    let solution = cholesky_solve(&gram, &rhs).ok_or_else(|| {
        RecommendError::Training("normal equations are not positive definite".to_string())
    })?;
    Ok(solution.mapv(|x| x as f32))
}

/// Solve a symmetric positive definite system `a x = b` by Cholesky.
///
/// Only the lower triangle of `a` is read. Returns `None` if a pivot is not
/// positive.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();

    // Factor: a = L Lᵀ
    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let head = l.slice(s![j, ..j]);
        let diag = a[[j, j]] - head.dot(&head);
        if !(diag > 0.0) {
            return None;
        }
        let diag = diag.sqrt();
        l[[j, j]] = diag;

        for i in (j + 1)..n {
            let value = a[[i, j]] - l.slice(s![i, ..j]).dot(&l.slice(s![j, ..j]));
            l[[i, j]] = value / diag;
        }
    }

    // Forward: L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let value = b[i] - l.slice(s![i, ..i]).dot(&y.slice(s![..i]));
        y[i] = value / l[[i, i]];
    }

    // Backward: Lᵀ x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let value = y[i] - l.slice(s![(i + 1).., i]).dot(&x.slice(s![(i + 1)..]));
        x[i] = value / l[[i, i]];
    }
    Some(x)
}

fn training_error(
    catalog: &Catalog,
    users: &[UserId],
    user_factors: &Array2<f32>,
    movie_factors: &Array2<f32>,
    movie_rows: &HashMap<MovieId, usize>,
) -> f32 {
    let (sum, count) = users
        .par_iter()
        .enumerate()
        .map(|(row, &user_id)| {
            let p = user_factors.row(row);
            catalog
                .user_ratings(user_id)
                .iter()
                .fold((0.0f64, 0usize), |(sum, count), rating| {
                    let q = movie_factors.row(movie_rows[&rating.movie_id]);
                    let error = rating.rating - p.dot(&q);
                    (sum + (error as f64).powi(2), count + 1)
                })
        })
        .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    if count == 0 {
        return 0.0;
    }
    (sum / count as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CatalogBuilder, Movie};
    use ndarray::array;

    fn rating(user_id: UserId, movie_id: MovieId, value: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating: value,
            timestamp: 0,
        }
    }

    fn create_test_catalog() -> Arc<Catalog> {
        let mut builder = CatalogBuilder::new();
        for id in 1..=5 {
            builder.insert_movie(Movie::new(id, format!("Movie {}", id), vec![]));
        }
        builder
            // User 1 likes all of 1, 2, 3 (sum 14)
            .insert_rating(rating(1, 1, 5.0))
            .insert_rating(rating(1, 2, 5.0))
            .insert_rating(rating(1, 3, 4.0))
            .insert_rating(rating(1, 4, 2.0))
            // User 2 likes all of 1, 2, 3 (sum 12)
            .insert_rating(rating(2, 1, 4.0))
            .insert_rating(rating(2, 2, 4.0))
            .insert_rating(rating(2, 3, 4.0))
            // User 3 likes only movie 1
            .insert_rating(rating(3, 1, 5.0))
            .insert_rating(rating(3, 4, 1.0))
            // User 4 likes none of them
            .insert_rating(rating(4, 1, 3.0))
            .insert_rating(rating(4, 4, 3.5));
        // Movie 5 is never rated
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_default_config() {
        let config = FactorConfig::default();
        assert_eq!(config.dimensions, 20);
        assert_eq!(config.iterations, 15);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_training_is_deterministic() {
        let catalog = create_test_catalog();
        let config = FactorConfig::default();
        let a = LatentFactorModel::train(catalog.clone(), &config).unwrap();
        let b = LatentFactorModel::train(catalog, &config).unwrap();

        for movie_id in 1..=5 {
            assert_eq!(a.embedding_of(movie_id), b.embedding_of(movie_id));
        }
        assert_eq!(a.training_rmse(), b.training_rmse());
    }

    #[test]
    fn test_training_fits_observed_ratings() {
        let model = LatentFactorModel::train(create_test_catalog(), &FactorConfig::default()).unwrap();

        assert!(model.training_rmse().is_finite());
        assert!(model.training_rmse() < 1.0);
        let predicted = model.predict(1, 1).unwrap();
        assert!((predicted - 5.0).abs() < 1.0);
    }

    #[test]
    fn test_unrated_movie_has_zero_embedding() {
        let model = LatentFactorModel::train(create_test_catalog(), &FactorConfig::default()).unwrap();

        let embedding = model.embedding_of(5).unwrap();
        assert_eq!(embedding.len(), 20);
        assert!(embedding.iter().all(|&x| x == 0.0));
        // Dot product 0 clamps up to the lowest rating
        assert_eq!(model.predict(1, 5), Some(RATING_MIN));
        assert_eq!(model.predict(99, 1), None);
    }

    #[test]
    fn test_invalid_config_fails() {
        let catalog = create_test_catalog();

        let zero_dims = FactorConfig {
            dimensions: 0,
            ..FactorConfig::default()
        };
        assert!(matches!(
            LatentFactorModel::train(catalog.clone(), &zero_dims),
            Err(RecommendError::Training(_))
        ));

        let negative = FactorConfig {
            regularization: -0.5,
            ..FactorConfig::default()
        };
        assert!(matches!(
            LatentFactorModel::train(catalog, &negative),
            Err(RecommendError::Training(_))
        ));
    }

    #[test]
    fn test_empty_rating_matrix_fails() {
        let mut builder = CatalogBuilder::new();
        builder.insert_movie(Movie::new(1, "Lonely", vec![]));
        let catalog = Arc::new(builder.build().unwrap());

        let result = LatentFactorModel::train(catalog, &FactorConfig::default());
        assert!(matches!(result, Err(RecommendError::Training(_))));
    }

    #[test]
    fn test_similar_users_require_every_movie() {
        let model = LatentFactorModel::train(create_test_catalog(), &FactorConfig::default()).unwrap();

        assert_eq!(model.similar_users(&[1, 2, 3], 10), vec![1, 2]);
        assert_eq!(model.similar_users(&[1, 2, 3], 1), vec![1]);
        assert!(model.similar_users(&[1, 4, 5], 10).is_empty());
    }

    #[test]
    fn test_users_rating_any_ordering() {
        let model = LatentFactorModel::train(create_test_catalog(), &FactorConfig::default()).unwrap();

        // Users 1 and 2 liked three movies, user 3 one, user 4 none
        assert_eq!(model.users_rating_any(&[1, 2, 3], 10), vec![1, 2, 3]);
        // Users 1 and 3 tie on count and sum, so the lower id comes first
        assert_eq!(model.users_rating_any(&[1], 10), vec![1, 3, 2]);
    }

    #[test]
    fn test_prediction_is_embedding_dot_product() {
        let model = LatentFactorModel::train(create_test_catalog(), &FactorConfig::default()).unwrap();

        let user = model.user_embedding(2).unwrap();
        let movie = model.embedding_of(3).unwrap();
        assert_eq!(user.len(), model.dimensions());
        let expected = user.dot(&movie).clamp(RATING_MIN, RATING_MAX);
        assert_eq!(model.predict(2, 3), Some(expected));
    }

    #[test]
    fn test_cholesky_solve() {
        // [[4, 2], [2, 3]] x = [2, 1] -> x = [0.5, 0]
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);

        // 3x3: [[4, 2, 0], [2, 5, 1], [0, 1, 3]] x = [6, 8, 4] -> x = [1, 1, 1]
        let a = array![[4.0, 2.0, 0.0], [2.0, 5.0, 1.0], [0.0, 1.0, 3.0]];
        let x = cholesky_solve(&a, &array![6.0, 8.0, 4.0]).unwrap();
        for value in x.iter() {
            assert!((value - 1.0).abs() < 1e-12);
        }

        let singular = array![[0.0, 0.0], [0.0, 1.0]];
        assert!(cholesky_solve(&singular, &array![1.0, 1.0]).is_none());
    }
}
