use anyhow::{anyhow, Context, Result};
use catalog::{LibraryIndex, MediaKind, Timestamp, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::profile::days_since;
use engine::{
    CancellationToken, CatalogModel, ProgressEvent, Recommendation, RecommendationPipeline,
    RecommenderConfig, UserRecommendations,
};
use features::FeatureCategory;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// TasteRecs - Content-based recommendations for a media library
#[derive(Parser)]
#[command(name = "taste-recs")]
#[command(about = "Content-based movie and series recommendations from watch history", long_about = None)]
struct Cli {
    /// Directory holding catalog.json and watch_history.json
    #[arg(short, long, default_value = "data/sample")]
    data_dir: PathBuf,

    /// JSON file overriding the default recommender configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reference time in Unix seconds (defaults to the current time)
    #[arg(long)]
    now: Option<Timestamp>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a single user
    Recommend {
        /// User to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Only show one media kind (movie or series)
        #[arg(long)]
        kind: Option<MediaKind>,

        /// Results per media kind (overrides the configured counts)
        #[arg(long)]
        limit: Option<usize>,

        /// Show which features each recommendation shares with the watch history
        #[arg(long)]
        explain: bool,
    },

    /// Refresh recommendations for every user
    Run {
        /// Write the full result as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show a user's watch history, event weights and strongest profile features
    User {
        /// User to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Show the most frequent vocabulary entries per category
    Vocabulary {
        /// Entries to show per category
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Measure single-user recommendation latency
    Benchmark {
        /// Number of users to sample
        #[arg(long, default_value = "100")]
        users: usize,
    },
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

    let config = load_config(cli.config.as_deref())?;
    let now = match cli.now {
        Some(now) => now,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as Timestamp,
    };

    println!("Loading library from {}...", cli.data_dir.display());
    let start = Instant::now();
    let library = Arc::new(
        LibraryIndex::load_from_dir(&cli.data_dir).context("Failed to load media library")?,
    );
    let (items, users, records) = library.counts();
    println!(
        "{} Loaded {} items, {} users, {} watch records in {:?}",
        "✓".green(),
        items,
        users,
        records,
        start.elapsed()
    );

    // Ctrl-C cancels whatever phase is running
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Recommend {
            user_id,
            kind,
            limit,
            explain,
        } => {
            let config = match limit {
                Some(limit) => config.with_result_counts(limit, limit),
                None => config,
            };
            handle_recommend(library, config, cancel, user_id, kind, now, explain).await?
        }
        Commands::Run { output } => handle_run(library, config, cancel, now, output).await?,
        Commands::User { user_id } => handle_user(library, config, cancel, user_id, now).await?,
        Commands::Vocabulary { top } => handle_vocabulary(library, config, cancel, top).await?,
        Commands::Benchmark { users } => handle_benchmark(library, config, cancel, users, now).await?,
    }

    Ok(())
}

/// Read and validate the config before any data is loaded
fn load_config(path: Option<&Path>) -> Result<RecommenderConfig> {
    let Some(path) = path else {
        return Ok(RecommenderConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&json).with_context(|| format!("Invalid config file {}", path.display()))
}

fn parse_config(json: &str) -> Result<RecommenderConfig> {
    let config = RecommenderConfig::from_json(json)?;
    config.validate()?;
    Ok(config)
}

/// Fit the catalog model off the async runtime
async fn fit_model(
    library: Arc<LibraryIndex>,
    pipeline: RecommendationPipeline,
    cancel: CancellationToken,
) -> Result<Arc<CatalogModel>> {
    let start = Instant::now();
    let model = tokio::task::spawn_blocking(move || pipeline.fit(&library, &cancel)).await??;
    println!(
        "{} Embedded {} items ({} dimensions) in {:?}",
        "✓".green(),
        model.embeddings().len(),
        model.dimension(),
        start.elapsed()
    );
    Ok(Arc::new(model))
}

/// Handle the 'recommend' command
async fn handle_recommend(
    library: Arc<LibraryIndex>,
    config: RecommenderConfig,
    cancel: CancellationToken,
    user_id: UserId,
    kind: Option<MediaKind>,
    now: Timestamp,
    explain: bool,
) -> Result<()> {
    let pipeline = RecommendationPipeline::new(config)?;
    let model = fit_model(library.clone(), pipeline.clone(), cancel).await?;

    let recs = tokio::task::spawn_blocking(move || {
        pipeline.recommend_for_user(&model, &library, &user_id, now)
    })
    .await??;

    print_user_recommendations(&recs, kind, explain);
    Ok(())
}

/// Handle the 'run' command
async fn handle_run(
    library: Arc<LibraryIndex>,
    config: RecommenderConfig,
    cancel: CancellationToken,
    now: Timestamp,
    output: Option<PathBuf>,
) -> Result<()> {
    let pipeline = RecommendationPipeline::new(config)?.with_progress(print_progress);

    let start = Instant::now();
    let results = tokio::task::spawn_blocking(move || pipeline.run(&library, now, &cancel)).await??;
    println!(
        "{} Refreshed recommendations for {} users in {:?}",
        "✓".green(),
        results.len(),
        start.elapsed()
    );

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&results)?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        None => {
            for recs in results.values() {
                let status = if recs.cold_start {
                    "cold start".yellow().to_string()
                } else {
                    format!("{} watched", recs.watched_item_count)
                };
                println!(
                    "{} ({}): {} movies, {} series",
                    recs.user_id.bold(),
                    status,
                    recs.movies.len(),
                    recs.series.len()
                );
            }
        }
    }
    Ok(())
}

/// Handle the 'user' command
async fn handle_user(
    library: Arc<LibraryIndex>,
    config: RecommenderConfig,
    cancel: CancellationToken,
    user_id: UserId,
    now: Timestamp,
) -> Result<()> {
    let history = library.user_history(&user_id);
    if history.is_empty() {
        return Err(anyhow!("User {} has no watch history", user_id));
    }

    let pipeline = RecommendationPipeline::new(config)?;

    println!("{}", format!("User: {}", user_id).bold().blue());
    println!("{}Watch records: {}", "• ".green(), history.len());

    let weights = pipeline.config().weights();
    println!("Watch history:");
    for record in &history {
        let days = days_since(record.last_played, now);
        let weight = weights.combined_weight(days, record.is_favorite, record.play_count)?;
        let name = library
            .get_item(&record.item_id)
            .map(|item| item.name.as_str())
            .unwrap_or("(not in catalog)");
        println!(
            "  - {} [{} plays{}] {:.0} days ago, weight {:.3}",
            name,
            record.play_count,
            if record.is_favorite { ", favorite" } else { "" },
            days,
            weight
        );
    }

    let model = fit_model(library.clone(), pipeline.clone(), cancel).await?;
    let profile_model = model.clone();
    let profile = tokio::task::spawn_blocking(move || {
        pipeline.build_profile(&profile_model, &library, &user_id, now)
    })
    .await??;

    let Some(profile) = profile else {
        println!("{}", "No watched item is in the catalog: cold start".yellow());
        return Ok(());
    };

    // Map profile dimensions back to vocabulary entries
    let mut labelled = Vec::new();
    let mut offset = 0;
    for category in FeatureCategory::ALL {
        let terms = model.vocabulary().category(category).terms();
        for (i, term) in terms.iter().enumerate() {
            labelled.push((category, term.as_str(), profile.vector[offset + i]));
        }
        offset += terms.len();
    }
    labelled.retain(|(_, _, weight)| *weight > 0.0);
    labelled.sort_by(|a, b| b.2.total_cmp(&a.2));

    println!("Strongest profile features:");
    for (category, term, weight) in labelled.iter().take(10) {
        println!("  - {} ({}): {:.3}", term, category.label(), weight);
    }
    Ok(())
}

/// Handle the 'vocabulary' command
async fn handle_vocabulary(
    library: Arc<LibraryIndex>,
    config: RecommenderConfig,
    cancel: CancellationToken,
    top: usize,
) -> Result<()> {
    let pipeline = RecommendationPipeline::new(config)?;
    let model = fit_model(library.clone(), pipeline, cancel).await?;

    let total = library.items().len();
    for category in FeatureCategory::ALL {
        let vocab = model.vocabulary().category(category);
        println!(
            "{}",
            format!("{} ({} entries)", category.label(), vocab.len()).bold().blue()
        );
        for (term, df) in vocab.frequencies().take(top) {
            let idf = model.space().idf(category).get(term).copied().unwrap_or(0.0);
            println!("  - {} in {}/{} items, idf {:.3}", term, df, total, idf);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    library: Arc<LibraryIndex>,
    config: RecommenderConfig,
    cancel: CancellationToken,
    users: usize,
    now: Timestamp,
) -> Result<()> {
    let pipeline = RecommendationPipeline::new(config)?;
    let model = fit_model(library.clone(), pipeline.clone(), cancel.clone()).await?;

    let known: Vec<UserId> = library.user_ids().cloned().collect();
    if known.is_empty() {
        return Err(anyhow!("No users with watch history to benchmark"));
    }

    // Sample users with replacement
    let sampled: Vec<UserId> = (0..users)
        .map(|_| known[rand::random_range(0..known.len())].clone())
        .collect();

    let start = Instant::now();
    let mut handles = vec![];
    for user in sampled {
        let pipeline = pipeline.clone();
        let model = model.clone();
        let library = library.clone();
        let cancel = cancel.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            cancel.check()?;
            let start = Instant::now();
            pipeline.recommend_for_user(&model, &library, &user, now)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = start.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    let total: Duration = timings.iter().sum();
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", timings.len());
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f32 / wall_time.as_secs_f32()
    );
    Ok(())
}

fn print_progress(event: &ProgressEvent) {
    let message = match event {
        ProgressEvent::VocabularyBuilt {
            features,
            dimension,
        } => format!("Vocabulary built: {} features, {} dimensions", features, dimension),
        ProgressEvent::EmbeddingsComputed { items } => format!("Embedded {} items", items),
        ProgressEvent::ProfilesBuilt {
            profiles,
            cold_start,
        } => format!("Built {} profiles ({} cold start)", profiles, cold_start),
        ProgressEvent::ScoringComplete { users } => format!("Scored {} users", users),
    };
    println!("{} {}", "→".cyan(), message);
}

fn print_user_recommendations(recs: &UserRecommendations, kind: Option<MediaKind>, explain: bool) {
    if recs.cold_start {
        println!(
            "{}",
            format!("No usable watch history for {}: nothing to recommend yet", recs.user_id).yellow()
        );
        return;
    }

    println!(
        "{}",
        format!("Recommendations for {} (from {} watched items)", recs.user_id, recs.watched_item_count)
            .bold()
            .blue()
    );
    for media_kind in MediaKind::ALL {
        if kind.is_some_and(|k| k != media_kind) {
            continue;
        }
        let header = match media_kind {
            MediaKind::Movie => "Movies:",
            MediaKind::Series => "Series:",
        };
        println!("{}", header.bold());
        print_recommendations(recs.for_kind(media_kind), explain);
    }
}

/// Helper function to format and print one ranked list
fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    if recommendations.is_empty() {
        println!("  (none)");
        return;
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        let year = rec.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!(
            "{}. {}{} - Score: {:.3}",
            (rank + 1).to_string().green(),
            rec.name,
            year,
            rec.score
        );
        if explain {
            println!("   {}", rec.explanation);
        }
    }
}
