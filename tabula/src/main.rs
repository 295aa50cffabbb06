// tabula/src/main.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "The Tabular Transformation & Lineage Engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 🚀 Runs a cleaning recipe against the project datasets
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Run a single CSV file instead of scanning the data directory
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Recipe file (default: <project-dir>/recipe.yaml)
        #[arg(long, short)]
        recipe: Option<PathBuf>,
    },

    /// 📊 Computes the quality report of a CSV dataset
    Score {
        /// CSV file to score
        input: PathBuf,

        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// 🔍 Inspects a CSV dataset (schema + sample rows)
    Inspect {
        /// CSV file to inspect
        input: PathBuf,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// ⚡ Executes a read-only SQL query against a CSV dataset (view 'data')
    Query {
        query: String,

        /// CSV file to query
        #[arg(long, short)]
        input: PathBuf,

        /// Maximum number of result rows to display
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// 🔗 Lists the recorded version history of the project datasets
    History {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Restrict to a single dataset id
        #[arg(long, short)]
        dataset: Option<String>,

        /// Output format: table | json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// 📚 Lists the supported operations and their parameter schemas
    Ops {},

    /// 🧹 Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug tabula run ... pour voir les détails
    // Logs vont sur stderr : stdout reste réservé aux résultats (--json).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            input,
            recipe,
        } => {
            let result = commands::run::execute(project_dir, input, recipe).await;
            match result {
                Ok(run_result) if run_result.success => {}
                Ok(run_result) => {
                    eprintln!("\n❌ FAILURE. {} dataset(s) failed.", run_result.errors.len());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("\n💥 CRITICAL RUN ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Score { input, json } => {
            if let Err(e) = commands::score::execute(input, json) {
                eprintln!("❌ Score failed: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Inspect { input, limit } => {
            if let Err(e) = commands::inspect::execute(input, limit) {
                eprintln!("❌ Inspect failed: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Query {
            query,
            input,
            limit,
        } => {
            if let Err(e) = commands::query::execute(query, input, limit) {
                eprintln!("❌ Query failed: {}", e);
                std::process::exit(1);
            }
        }

        Commands::History {
            project_dir,
            dataset,
            format,
        } => {
            if let Err(e) = commands::history::execute(project_dir, dataset, format).await {
                eprintln!("❌ History failed: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Ops {} => {
            if let Err(e) = commands::ops::execute() {
                eprintln!("❌ Ops failed: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Clean { project_dir } => {
            if let Err(e) = commands::clean::execute(project_dir) {
                eprintln!("❌ Clean failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
