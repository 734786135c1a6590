//! Forecast benchmark CLI
//!
//! - Sample a stratified evaluation set and print its source × horizon mix
//! - Run a simulated agent end to end and report overall / grouped metrics
//! - Generate and validate TOML config files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use forecast_bench::evaluation::metrics::skill_score;
use forecast_bench::sampling::horizon_summary;
use forecast_bench::types::horizons_list;
use forecast_bench::{BenchConfig, Harness, HorizonGroup, LogFormat, Problem, SourceCatalog};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "fbench")]
#[command(version, about = "Forecasting benchmark harness", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "fbench.toml", env = "FBENCH_CONFIG")]
    config: PathBuf,

    /// Override dataset directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override target evaluation-set size
    #[arg(long, global = true)]
    max_quest: Option<usize>,

    /// Override sampling seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw an evaluation set and print its source × horizon distribution
    Sample {
        /// Use a generated corpus of this many problems per source
        #[arg(long)]
        synthetic: Option<usize>,
    },
    /// Run a simulated forecasting agent and report metrics
    Demo {
        /// Use a generated corpus of this many problems per source
        #[arg(long)]
        synthetic: Option<usize>,

        /// Agent's prior probability
        #[arg(long, default_value_t = 0.5)]
        prior: f64,

        /// Uniform noise added to the prior
        #[arg(long, default_value_t = 0.2)]
        noise: f64,

        /// Predictions submitted per problem
        #[arg(long, default_value_t = 2)]
        revisions: usize,
    },
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "fbench.toml")]
        output: PathBuf,
    },
    /// Validate config without running
    ValidateConfig,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::GenerateConfig { output } = &cli.command {
        return generate_sample_config(output);
    }

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::ValidateConfig => {
            config.validate()?;
            println!("Configuration is valid:\n{:#?}", config);
        }
        Commands::Sample { synthetic } => {
            setup_logging(&config)?;
            let mut harness = build_harness(&config, *synthetic)?;
            harness.load(&config.sampling.loader_params())?;
            let problems: Vec<&Problem> = harness.problems().values().collect();
            print_distribution(&problems, harness.catalog());
        }
        Commands::Demo {
            synthetic,
            prior,
            noise,
            revisions,
        } => {
            setup_logging(&config)?;
            let mut harness = build_harness(&config, *synthetic)?;
            harness.load(&config.sampling.loader_params())?;
            run_demo(&harness, config.sampling.seed, *prior, *noise, *revisions).await?;
        }
        Commands::GenerateConfig { .. } => {}
    }

    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config(cli: &Cli) -> Result<BenchConfig, Box<dyn std::error::Error>> {
    let mut config = BenchConfig::load(&cli.config)?;

    // CLI args override config
    if let Some(dir) = &cli.data_dir {
        config.dataset.dir = dir.clone();
    }
    if let Some(max_quest) = cli.max_quest {
        config.sampling.max_quest = max_quest;
    }
    if let Some(seed) = cli.seed {
        config.sampling.seed = seed;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = parse_log_format(format)?;
    }
    Ok(config)
}

fn parse_log_format(s: &str) -> Result<LogFormat, Box<dyn std::error::Error>> {
    match s.to_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        "compact" => Ok(LogFormat::Compact),
        _ => Err(format!("Unknown log format '{}'. Use: pretty, json, compact", s).into()),
    }
}

fn setup_logging(config: &BenchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .compact()
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
        }
    }

    Ok(())
}

fn generate_sample_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let sample = BenchConfig::default();
    let content = sample.to_toml()?;

    let with_comments = format!(
        r#"# Forecast benchmark configuration
# See: fbench --help
#
# sampling.loader is one of: forecastbench_v1, forecastbench_v1_source,
#   forecastbench_v1_extensive, load_all, load_random, load_by_source
# evaluation.strategy "best" reads ground truth; use it only as an oracle.

{}"#,
        content
    );

    std::fs::write(path, with_comments)?;
    println!("Sample config written to: {}", path.display());
    Ok(())
}

// ============================================================================
// Corpus
// ============================================================================

fn build_harness(
    config: &BenchConfig,
    synthetic: Option<usize>,
) -> Result<Harness, Box<dyn std::error::Error>> {
    let harness = match synthetic {
        Some(per_source) => {
            let catalog = config.sources.catalog()?;
            let corpus = synthetic_corpus(&catalog, per_source, config.sampling.seed)?;
            info!(problems = corpus.len(), "Generated synthetic corpus");
            Harness::new(corpus, config)?
        }
        None => Harness::from_config(config)?,
    };
    Ok(harness)
}

/// Random but reproducible corpus covering every catalog source.
fn synthetic_corpus(
    catalog: &SourceCatalog,
    per_source: usize,
    seed: u64,
) -> Result<Vec<Problem>, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid synthetic start date")?;
    let mut corpus = Vec::new();
    for source in catalog.sources() {
        // Each source gets its own base rate
        let base_rate: f64 = rng.gen_range(0.1..0.9);
        for i in 0..per_source {
            let days: u32 = rng.gen_range(1..730);
            let end = start + Duration::days(days as i64);
            let outcome = if rng.gen_bool(base_rate) { 1.0 } else { 0.0 };
            corpus.push(
                Problem::new(
                    format!("fbv1_{source}_{i}"),
                    source,
                    start.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string(),
                    days,
                )
                .with_origin("synthetic", i.to_string())
                .with_question(Some(format!("Synthetic {source} question #{i}")))
                .with_resolution(true, Some(outcome)),
            );
        }
    }
    Ok(corpus)
}

// ============================================================================
// Demo agent
// ============================================================================

async fn run_demo(
    harness: &Harness,
    seed: u64,
    prior: f64,
    noise: f64,
    revisions: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let views = harness.get_problems();
    info!(problems = views.len(), prior, noise, revisions, "Starting simulated agent");

    if let Some(first) = views.first() {
        for function in harness.available_search_functions() {
            let query = first.question_text.as_deref().unwrap_or(&first.id);
            let outcome = harness.search(&function, &first.id, query).await?;
            match &outcome.error {
                Some(err) => warn!(function = %function, error = %err, "Demo search failed"),
                None => info!(
                    function = %function,
                    returned = outcome.returned_after_filter,
                    "Demo search"
                ),
            }
        }
    }

    for view in &views {
        for _ in 0..revisions.max(1) {
            let jitter = if noise > 0.0 { rng.gen_range(-noise..noise) } else { 0.0 };
            let prediction = (prior + jitter).clamp(0.0, 1.0);
            harness.submit_prediction(&view.id, prediction)?;
        }
    }

    let report = harness.report(None)?;
    let grouped = harness.grouped_metrics()?;

    let outcomes: Vec<f64> = harness
        .problems()
        .values()
        .filter_map(Problem::outcome)
        .collect();
    let base_rate = if outcomes.is_empty() {
        0.0
    } else {
        outcomes.iter().sum::<f64>() / outcomes.len() as f64
    };

    let border = "=".repeat(72);
    let separator = "-".repeat(72);
    println!("{}", border);
    println!("{:^72}", "EVALUATION REPORT");
    println!("{}", border);
    println!(
        " Strategy: {}   Submissions: {}",
        harness.engine().strategy(),
        harness.submission_count()
    );
    for (name, value) in &report {
        println!(" {:<14} {:>10.4}", name, value);
    }
    if let Some(bss) = report
        .get("brier_score")
        .and_then(|b| skill_score(*b, base_rate))
    {
        println!(" {:<14} {:>10.4}  (vs base rate {:.3})", "skill_score", bss, base_rate);
    }
    println!("{}", separator);
    println!(
        " {:<12} {:<16} {:>6} {:>10} {:>10}",
        "source", "horizon", "count", "brier", "accuracy"
    );
    println!("{}", separator);
    for ((source, horizon), m) in &grouped {
        println!(
            " {:<12} {:<16} {:>6} {:>10.4} {:>10.4}",
            source,
            horizon.label(),
            m.count,
            m.brier_score,
            m.accuracy
        );
    }
    println!("{}", border);
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_distribution(problems: &[&Problem], catalog: &SourceCatalog) {
    let summary: BTreeMap<String, BTreeMap<HorizonGroup, usize>> =
        horizon_summary(problems.iter().copied());
    let horizons = horizons_list();

    let separator = "-".repeat(14 + 8 * (horizons.len() + 1));
    println!("{}", separator);
    print!(" {:<12}", "source");
    for group in HorizonGroup::all() {
        print!(" {:>7}", short_label(group));
    }
    println!(" {:>7}", "total");
    println!("{}", separator);

    let mut column_totals = [0usize; 6];
    for (source, by_horizon) in &summary {
        let marker = if catalog.is_market(source) { "*" } else { " " };
        print!(" {:<11}{}", source, marker);
        let mut row_total = 0;
        for (i, group) in HorizonGroup::all().iter().enumerate() {
            let n = by_horizon.get(group).copied().unwrap_or(0);
            column_totals[i] += n;
            row_total += n;
            print!(" {:>7}", n);
        }
        println!(" {:>7}", row_total);
    }
    println!("{}", separator);
    print!(" {:<12}", "total");
    for n in column_totals {
        print!(" {:>7}", n);
    }
    println!(" {:>7}", problems.len());
    println!("{}", separator);
    println!(" * market source (horizon-stratified)");
    println!(" horizons: {}", horizons.join(", "));
}

fn short_label(group: HorizonGroup) -> &'static str {
    match group {
        HorizonGroup::ShortTerm => "short",
        HorizonGroup::NearTerm => "near",
        HorizonGroup::MediumTerm => "medium",
        HorizonGroup::LongTerm => "long",
        HorizonGroup::VeryLongTerm => "v_long",
        HorizonGroup::Extended => "ext",
    }
}
