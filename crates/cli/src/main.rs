use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Catalog, CatalogPaths, CategoryField};
use engine::{EngineConfig, Recommendation, RecommendationError, RecommendationOrchestrator, Strategy};
use rand::seq::IndexedRandom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// ReelRecs - Seed-based Movie Recommender
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Recommend movies from three movies you already like", long_about = None)]
struct Cli {
    /// Directory containing movies.csv, imdb_data.csv, tags.csv and ratings.csv
    #[arg(short, long, default_value = "resources/data")]
    data_dir: PathBuf,

    /// JSON engine configuration (factor model and neighbour settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to three seed titles
    Recommend {
        /// Scoring strategy
        #[arg(long, value_enum, default_value_t = StrategyArg::Content)]
        strategy: StrategyArg,

        /// Exactly three seed titles, e.g. "Toy Story (1995)"
        #[arg(long, num_args = 3, required = true)]
        titles: Vec<String>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Show the score next to each recommendation
        #[arg(long)]
        scores: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show metadata and rating statistics for one movie
    Movie {
        /// Exact movie title
        #[arg(long)]
        title: String,
    },

    /// Show the most common values of a metadata field
    Stats {
        #[arg(long, value_enum)]
        field: FieldArg,

        /// Number of values to show
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        #[arg(long, value_enum, default_value_t = StrategyArg::Content)]
        strategy: StrategyArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Content,
    Collaborative,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Content => Strategy::Content,
            StrategyArg::Collaborative => Strategy::Collaborative,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Genres,
    Cast,
    Director,
    Keywords,
}

impl From<FieldArg> for CategoryField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Genres => CategoryField::Genres,
            FieldArg::Cast => CategoryField::Cast,
            FieldArg::Director => CategoryField::Director,
            FieldArg::Keywords => CategoryField::PlotKeywords,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            strategy,
            titles,
            top_n,
            scores,
        } => {
            let orchestrator = start_engine(&cli.data_dir, config).await?;
            handle_recommend(&orchestrator, strategy.into(), &titles, top_n, scores)?
        }
        Commands::Search { title, limit } => {
            handle_search(&load_catalog(&cli.data_dir)?, &title, limit)
        }
        Commands::Movie { title } => handle_movie(&load_catalog(&cli.data_dir)?, &title)?,
        Commands::Stats { field, top } => {
            handle_stats(&load_catalog(&cli.data_dir)?, field.into(), top)
        }
        Commands::Benchmark {
            requests,
            concurrent,
            strategy,
        } => {
            let orchestrator = start_engine(&cli.data_dir, config).await?;
            handle_benchmark(orchestrator, requests, concurrent, strategy.into()).await?
        }
    }

    Ok(())
}

fn load_catalog(data_dir: &Path) -> Result<Catalog> {
    println!("Loading catalog from {}...", data_dir.display());
    let start = Instant::now();
    let catalog = Catalog::load(&CatalogPaths::from_dir(data_dir))
        .with_context(|| format!("Failed to load catalog from {}", data_dir.display()))?;
    println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());
    Ok(catalog)
}

/// Load the catalog and train the models off the async runtime
async fn start_engine(data_dir: &Path, config: EngineConfig) -> Result<Arc<RecommendationOrchestrator>> {
    println!("Building recommendation engine from {}...", data_dir.display());
    let start = Instant::now();
    let data_dir = data_dir.to_path_buf();
    let orchestrator = tokio::task::spawn_blocking(move || engine::init(&data_dir, &config))
        .await
        .context("Engine startup task panicked")?
        .context("Failed to build recommendation engine")?;
    println!("{} Engine ready in {:?}", "✓".green(), start.elapsed());
    Ok(orchestrator)
}

/// Handle the 'recommend' command
fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    strategy: Strategy,
    titles: &[String],
    top_n: usize,
    scores: bool,
) -> Result<()> {
    let recommendations = orchestrator
        .recommend_scored(strategy, titles, top_n)
        .with_context(|| format!("{} recommendation failed", strategy))?;

    print_recommendations(strategy, &recommendations, scores);
    if recommendations.len() < top_n {
        println!(
            "{}",
            format!(
                "Only {} of {} requested recommendations available",
                recommendations.len(),
                top_n
            )
            .yellow()
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &Catalog, title: &str, limit: usize) {
    let matches = catalog.search_titles(title, limit);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches {
        let (avg_rating, rating_count) = catalog
            .movie_stats(movie.id)
            .map(|s| (s.avg_rating, s.rating_count))
            .unwrap_or((0.0, 0));
        println!(
            "{}: {} [{}] avg {:.2} ({} ratings)",
            movie.id.to_string().green(),
            movie.title,
            movie.genres.join(", "),
            avg_rating,
            rating_count
        );
    }
}

/// Handle the 'movie' command
fn handle_movie(catalog: &Catalog, title: &str) -> Result<()> {
    let movie_id = catalog.resolve_title(title)?;
    let movie = catalog.movie(movie_id)?;

    println!("{}", format!("{} (id {})", movie.title, movie.id).bold().blue());
    if let Some(year) = movie.year {
        println!("{}Year: {}", "• ".green(), year);
    }
    println!("{}Genres: {}", "• ".green(), join_or_dash(&movie.genres));
    println!(
        "{}Director: {}",
        "• ".green(),
        movie.director.as_deref().unwrap_or("-")
    );
    println!("{}Cast: {}", "• ".green(), join_or_dash(&movie.cast));
    println!("{}Keywords: {}", "• ".green(), join_or_dash(&movie.plot_keywords));
    if let Some(runtime) = movie.runtime {
        println!("{}Runtime: {} min", "• ".green(), runtime);
    }

    let tags = catalog.tags_for(movie_id);
    println!("{}Tags: {}", "• ".cyan(), tags.len());
    match catalog.movie_stats(movie_id) {
        Some(stats) => println!(
            "{}Average rating: {:.2} ({} ratings)",
            "• ".cyan(),
            stats.avg_rating,
            stats.rating_count
        ),
        None => println!("{}No ratings", "• ".cyan()),
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(catalog: &Catalog, field: CategoryField, top: usize) {
    let counts = catalog.value_counts(field);

    println!(
        "{}",
        format!(
            "Top {} values of {} ({} distinct):",
            top.min(counts.len()),
            field.column_name(),
            counts.len()
        )
        .bold()
        .blue()
    );
    for (i, (value, count)) in counts.iter().take(top).enumerate() {
        println!("{:>3}. {} ({} movies)", (i + 1).to_string().green(), value, count);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: Arc<RecommendationOrchestrator>,
    requests: usize,
    concurrent: usize,
    strategy: Strategy,
) -> Result<()> {
    let catalog = orchestrator.catalog().clone();
    let titles: Vec<String> = catalog.movies().map(|m| m.title.clone()).collect();
    anyhow::ensure!(titles.len() >= 3, "Catalog needs at least 3 movies to benchmark");

    // Random seed triples, drawn up front
    let seed_sets: Vec<Vec<String>> = {
        let mut rng = rand::rng();
        (0..requests)
            .map(|_| titles.choose_multiple(&mut rng, 3).cloned().collect())
            .collect()
    };

    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    // One blocking task per request; the semaphore caps concurrency
    let mut handles = vec![];
    for seeds in seed_sets {
        let orchestrator = orchestrator.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                orchestrator
                    .recommend(strategy, seeds.as_slice(), 10)
                    .map(|_| start.elapsed())
            })
            .await?;
            Ok::<_, anyhow::Error>(result)
        }));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    let mut failures = 0usize;
    for handle in handles {
        match handle.await?? {
            Ok(elapsed) => timings.push(elapsed),
            Err(err) => {
                failures += 1;
                log_benchmark_failure(&err);
            }
        }
    }
    let total_time = wall_clock.elapsed();

    println!("{}", format!("Benchmark results ({}):", strategy).bold().blue());
    println!("Requests: {} ({} failed)", requests, failures);
    println!("Total time: {:?}", total_time);
    if timings.is_empty() {
        println!("{}", "No successful requests".red());
        return Ok(());
    }

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| {
        let idx = ((timings.len() as f64 * p) as usize).min(timings.len() - 1);
        timings[idx]
    };
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);
    info!("Benchmark finished in {:?}", total_time);

    Ok(())
}

fn log_benchmark_failure(err: &RecommendationError) {
    match err {
        // Expected for random seeds (no shared raters, repeated titles)
        RecommendationError::InsufficientData { .. } | RecommendationError::DuplicateSeed { .. } => {}
        other => warn!("Benchmark request failed: {}", other),
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Helper function to format and print recommendations
fn print_recommendations(strategy: Strategy, recommendations: &[Recommendation], scores: bool) {
    println!("{}", format!("Recommendations ({}):", strategy).bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        let rank = (i + 1).to_string().green();
        if scores {
            println!("{}. {} - Score: {:.3}", rank, rec.title, rec.score);
        } else {
            println!("{}. {}", rank, rec.title);
        }
    }
}
