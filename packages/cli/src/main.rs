#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for casewatch.
//!
//! Every subcommand loads one source, applies the `--years`/`--regions`
//! filter and prints a view of the result. Without a subcommand an
//! interactive session starts instead.
//!
//! Uses `indicatif-log-bridge` (via [`casewatch_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;

use casewatch_analytics::{
    aggregate_by_region, aggregate_by_year, filter, sort_most_recent_first, top_with_remainder,
};
use casewatch_analytics_models::FilterSelection;
use casewatch_context::{ContextBudget, build_request_text};
use casewatch_dataset_models::Dataset;
use casewatch_source::registry::{DEFAULT_SOURCE_ID, all_sources};
use casewatch_source::{SourceDefinition, SourceError};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "casewatch", about = "Explore incident CSV datasets")]
struct Cli {
    #[command(flatten)]
    data: DataArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Which data to load and how to narrow it.
#[derive(Args)]
struct DataArgs {
    /// Registered source id or path to a CSV file (see `casewatch sources`)
    #[arg(long, global = true)]
    source: Option<String>,
    /// CSV file to load. Takes precedence over `--source`.
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    /// Comma-separated years to keep
    #[arg(long, global = true, value_delimiter = ',')]
    years: Vec<i32>,
    /// Comma-separated regions to keep (case-insensitive)
    #[arg(long, global = true, value_delimiter = ',')]
    regions: Vec<String>,
}

impl DataArgs {
    fn source_definition(&self) -> Result<SourceDefinition, SourceError> {
        if let Some(path) = &self.file {
            return Ok(SourceDefinition::from_path(path));
        }
        casewatch_server::resolve_source(self.source.as_deref().unwrap_or(DEFAULT_SOURCE_ID))
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection::new(self.years.iter().copied(), &self.regions)
    }
}

/// Limits on the context sent with a question.
#[derive(Args)]
struct BudgetArgs {
    /// Maximum records in the excerpt
    #[arg(long, default_value_t = ContextBudget::DEFAULT_MAX_ROWS)]
    max_rows: usize,
    /// Maximum characters in the excerpt
    #[arg(long, default_value_t = ContextBudget::DEFAULT_MAX_CHARS)]
    max_chars: usize,
    /// Entries in each top-N statistics list
    #[arg(long, default_value_t = ContextBudget::DEFAULT_TOP_N)]
    top_n: usize,
}

impl From<&BudgetArgs> for ContextBudget {
    fn from(args: &BudgetArgs) -> Self {
        Self {
            max_rows: args.max_rows,
            max_chars: args.max_chars,
            top_n: args.top_n,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered sources
    Sources,
    /// Headline metrics of the filtered records
    Metrics,
    /// Case totals per year
    Years,
    /// Case totals per region, largest first
    Regions {
        /// Keep this many regions and fold the rest into OTHER
        #[arg(long)]
        top: Option<usize>,
    },
    /// The filtered records, most recent first
    Records {
        /// Number of records to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print the text that would be sent with a question
    Context {
        /// Question to append
        #[arg(long, default_value = "")]
        question: String,
        #[command(flatten)]
        budget: BudgetArgs,
    },
    /// Ask an LLM a question about the filtered records.
    /// The provider is configured with `AI_PROVIDER` and the matching
    /// `*_API_KEY` environment variable.
    Ask {
        /// The question
        question: String,
        #[command(flatten)]
        budget: BudgetArgs,
    },
    /// Start the dashboard API server (configured via `BIND_ADDR`, `PORT`)
    Serve {
        /// Prompt for the server configuration
        #[arg(long)]
        interactive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = casewatch_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let source = cli.data.source_definition()?;
        return interactive::run(&multi, &source).await;
    };

    match command {
        Commands::Sources => print!("{}", commands::render_sources(&all_sources()?)),
        Commands::Serve { interactive } => {
            let mut config = casewatch_server::ServerConfig::from_env()?;
            if cli.data.source.is_some() || cli.data.file.is_some() {
                config.source = cli.data.source_definition()?;
            }
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(async move {
                    if interactive {
                        casewatch_server::interactive::run().await
                    } else {
                        casewatch_server::run_server(config).await
                    }
                })
            })
            .await??;
        }
        Commands::Metrics => {
            let filtered = load_filtered(&multi, &cli.data).await?;
            print!("{}", commands::render_metrics(&filtered));
        }
        Commands::Years => {
            let filtered = load_filtered(&multi, &cli.data).await?;
            print!(
                "{}",
                commands::render_totals("YEAR", &aggregate_by_year(&filtered))
            );
        }
        Commands::Regions { top } => {
            let filtered = load_filtered(&multi, &cli.data).await?;
            let rows = aggregate_by_region(&filtered);
            let rows = match top {
                Some(top) => top_with_remainder(rows, top, commands::OTHER_LABEL),
                None => rows,
            };
            print!("{}", commands::render_totals("REGION", &rows));
        }
        Commands::Records { limit } => {
            let sorted = sort_most_recent_first(&load_filtered(&multi, &cli.data).await?);
            print!("{}", commands::render_records(sorted.head(limit)));
            println!("({} of {} records)", limit.min(sorted.len()), sorted.len());
        }
        Commands::Context { question, budget } => {
            let filtered = load_filtered(&multi, &cli.data).await?;
            print!(
                "{}",
                build_request_text(&filtered, &ContextBudget::from(&budget), &question)
            );
        }
        Commands::Ask { question, budget } => {
            let filtered = load_filtered(&multi, &cli.data).await?;
            let outcome =
                commands::ask_question(&filtered, &ContextBudget::from(&budget), &question)
                    .await?;
            print!("{}", commands::render_answer(&outcome));
        }
    }

    Ok(())
}

async fn load_filtered(
    multi: &casewatch_cli_utils::MultiProgress,
    data: &DataArgs,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    let dataset = commands::load_dataset(multi, &data.source_definition()?).await?;
    let filtered = filter(&dataset, &data.selection());
    log::info!(
        "{} of {} records match the filter",
        filtered.len(),
        dataset.len()
    );
    Ok(filtered)
}
