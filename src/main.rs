//! SQL guard binary entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sql_guard::{
    Evaluator, GuardConfig, GuardConfigBuilder, SimilarityScorer, SqlValidator,
    evaluation::load_cases, policy_summary,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "sql-guard", version)]
#[command(about = "Validate LLM-generated SQL and score it against reference queries")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a query; reads stdin when no query is given
    Validate {
        query: Option<String>,
    },
    /// Score a generated query against a reference query
    Compare {
        #[arg(short, long)]
        generated: String,
        #[arg(short, long)]
        expected: String,
        /// Target table (defaults to the configured table)
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Run an evaluation corpus of recorded model responses
    Evaluate {
        cases: PathBuf,
    },
    /// Print the security rules
    Policy,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    debug!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { query } => {
            let query = match query {
                Some(query) => query,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read query from stdin")?;
                    buf
                }
            };

            let verdict = SqlValidator::new().validate(&query);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            if !verdict.is_safe() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Compare {
            generated,
            expected,
            table,
        } => {
            let table = table.unwrap_or_else(|| config.table_name.clone());
            let scorer = SimilarityScorer::with_config(config.scoring.clone());
            let result = scorer.compare(&generated, &expected, &table);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Evaluate { cases } => {
            let cases = load_cases(&cases)
                .with_context(|| format!("Failed to load cases from {}", cases.display()))?;
            let report = Evaluator::from_config(&config).run(&cases)?;
            info!(
                "Average similarity: {}",
                report
                    .average_score
                    .map(|s| format!("{:.1}%", s))
                    .unwrap_or_else(|| "n/a".into())
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Policy => {
            print!("{}", policy_summary());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&std::path::Path>) -> Result<GuardConfig> {
    let builder = match path {
        Some(path) => GuardConfigBuilder::new().from_file(path)?,
        None => GuardConfig::builder(),
    };
    let config = builder.from_env()?.build()?;
    debug!("Using table {}", config.table_name);
    Ok(config)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sql_guard=info,warn"));

    // Structured logs go to stderr; stdout carries the JSON results
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .json()
        .init();
}
