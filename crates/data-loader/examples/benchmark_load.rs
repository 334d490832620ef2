use data_loader::{Catalog, CatalogPaths};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("resources/data");

    println!("Loading catalog from {}...\n", data_dir.display());

    let start = Instant::now();
    let catalog = Catalog::load(&CatalogPaths::from_dir(data_dir))
        .expect("Failed to load catalog");
    let elapsed = start.elapsed();

    let counts = catalog.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", counts.movies);
    println!("Users: {}", counts.users);
    println!("Ratings: {}", counts.ratings);
    println!("Tags: {}", counts.tags);
    println!("\nPerformance: {:.0} ratings/second",
             counts.ratings as f64 / elapsed.as_secs_f64());
}
