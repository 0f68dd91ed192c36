mod input;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use websift_config::AppConfig;
use websift_extract::{ChatClient, LlmAnalyzer};
use websift_pipeline::{Pipeline, Throttle, to_json, write_summary_csv_file};
use websift_search::SearchClient;

#[derive(Debug, Parser)]
#[command(
    name = "websift",
    version,
    about = "Enrich a CSV of entities with web search results and LLM analysis"
)]
struct Cli {
    /// Input table (CSV with a header row).  Not needed with --init-config.
    input: Option<PathBuf>,

    /// Header name of the entity column (default: first column).
    #[arg(long)]
    column: Option<String>,

    /// Search template; must contain the {entity} placeholder.
    #[arg(long)]
    template: Option<String>,

    /// Config file path.
    #[arg(long, default_value = "websift.toml")]
    config: PathBuf,

    /// Destination for the summary CSV export.
    #[arg(long, default_value = "websift_results.csv")]
    out_csv: PathBuf,

    /// Destination for the full JSON export.
    #[arg(long, default_value = "websift_results.json")]
    out_json: PathBuf,

    /// Override the configured inter-row delay, in seconds.
    #[arg(long)]
    delay_secs: Option<u64>,

    /// Override the configured per-query hit limit.
    #[arg(long)]
    max_hits: Option<usize>,

    /// Write a default config file to the --config path and exit.
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.init_config {
        AppConfig::default()
            .save_to(&cli.config)
            .with_context(|| format!("failed to write {}", cli.config.display()))?;
        println!("wrote default config to {}", cli.config.display());
        return Ok(());
    }

    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    if let Some(delay) = cli.delay_secs {
        config.pipeline.delay_secs = delay;
    }
    if let Some(max_hits) = cli.max_hits {
        config.search.max_hits = max_hits;
    }

    init_tracing(&config.telemetry.log_level);

    if !config.has_credential() {
        bail!("no API key found; set WEBSIFT_API_KEY or GROQ_API_KEY (a .env file works)");
    }

    let input_path = cli
        .input
        .context("missing input table (or pass --init-config to write a config file)")?;
    let rows = input::read_rows(&input_path, cli.column.as_deref())?;
    if rows.is_empty() {
        bail!("input table {} has no usable rows", input_path.display());
    }
    let template = cli
        .template
        .unwrap_or_else(|| config.pipeline.default_template.clone());
    tracing::info!(rows = rows.len(), %template, "starting enrichment run");

    let search = SearchClient::new(&config.search)?;
    let analyzer = LlmAnalyzer::new(ChatClient::new(&config.llm)?);
    let pipeline = Pipeline::new(
        search,
        analyzer,
        config.search.max_hits,
        Throttle::from_secs(config.pipeline.delay_secs),
    );

    let progress = |done: usize, total: usize| {
        tracing::info!("processing {done}/{total}");
    };
    let results = pipeline.run(&rows, &template, &progress).await?;

    write_summary_csv_file(&results, &cli.out_csv)
        .with_context(|| format!("failed to write {}", cli.out_csv.display()))?;
    let json = to_json(&results)?;
    std::fs::write(&cli.out_json, json)
        .with_context(|| format!("failed to write {}", cli.out_json.display()))?;

    // Short per-row preview so a run is legible without opening the exports.
    for result in &results {
        let status = match (&result.analysis, &result.error) {
            (Some(a), _) => a.confidence.clone().unwrap_or_else(|| "N/A".to_string()),
            (None, Some(e)) => format!("row error: {e}"),
            (None, None) => "N/A".to_string(),
        };
        println!("{:<30} {status}", result.entity);
    }
    println!(
        "\n{} rows → {} and {}",
        results.len(),
        cli.out_csv.display(),
        cli.out_json.display()
    );

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
