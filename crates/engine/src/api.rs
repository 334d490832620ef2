//! Function-level entry points over the global engine.
//!
//! Both fail with `ModelUnavailable` until [`crate::init`] has succeeded.

use crate::error::Result;
use crate::orchestrator::Strategy;
use crate::startup::global;

/// Top `top_n` titles by metadata similarity to the three seed titles
pub fn content_model<S: AsRef<str>>(seed_titles: &[S], top_n: usize) -> Result<Vec<String>> {
    global()?.recommend(Strategy::Content, seed_titles, top_n)
}

/// Top `top_n` titles by the ratings of users who liked the three seed titles
pub fn collab_model<S: AsRef<str>>(seed_titles: &[S], top_n: usize) -> Result<Vec<String>> {
    global()?.recommend(Strategy::Collaborative, seed_titles, top_n)
}
