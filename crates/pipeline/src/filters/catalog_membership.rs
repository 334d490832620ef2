//! Filter to keep only movies the catalog knows.
//!
//! Every id that survives can be mapped back to a title.

use crate::traits::Filter;
use data_loader::Catalog;
use recommenders::{ScoredMovie, SeedSet};
use std::sync::Arc;

/// Removes scored ids that are not in the catalog.
pub struct CatalogMembershipFilter {
    catalog: Arc<Catalog>,
}

impl CatalogMembershipFilter {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl Filter for CatalogMembershipFilter {
    fn name(&self) -> &str {
        "CatalogMembershipFilter"
    }

    fn apply(&self, candidates: Vec<ScoredMovie>, _seeds: &SeedSet) -> Vec<ScoredMovie> {
        candidates
            .into_iter()
            .filter(|candidate| self.catalog.contains(candidate.movie_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CatalogBuilder, Movie};

    #[test]
    fn test_unknown_ids_removed() {
        let mut builder = CatalogBuilder::new();
        builder
            .insert_movie(Movie::new(1, "One", vec![]))
            .insert_movie(Movie::new(2, "Two", vec![]));
        let filter = CatalogMembershipFilter::new(Arc::new(builder.build().unwrap()));

        let seeds = SeedSet::new([7, 8, 9]).unwrap();
        let candidates = vec![
            ScoredMovie::new(1, 0.5),
            ScoredMovie::new(3, 0.9),
            ScoredMovie::new(2, 0.4),
        ];

        let filtered = filter.apply(candidates, &seeds);
        let ids: Vec<u32> = filtered.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
