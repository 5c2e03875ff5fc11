//! gradesheet CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "gradesheet",
    version,
    about = "Grade scanned answer sheets against an answer key"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a single answer sheet
    Grade {
        /// Answer key: stored key name or path to a CSV file
        #[arg(long)]
        key: String,

        /// Answer sheet (.txt or scanned image)
        #[arg(long)]
        sheet: PathBuf,

        /// Student name (default: sheet file name)
        #[arg(long)]
        student: Option<String>,

        /// Do not record the result in the ledger
        #[arg(long)]
        no_save: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade every answer sheet in a directory
    Batch {
        /// Answer key: stored key name or path to a CSV file
        #[arg(long)]
        key: String,

        /// Directory of answer sheets
        #[arg(long)]
        sheets: PathBuf,

        /// Max sheets graded concurrently (default: from config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory for reports
        #[arg(long, default_value = "./gradesheet-reports")]
        output: PathBuf,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Do not record results in the ledger
        #[arg(long)]
        no_save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show how a sheet is split into answers
    Segment {
        /// Answer sheet (.txt or scanned image)
        #[arg(long)]
        sheet: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Store an answer key CSV for later use
    UploadKey {
        /// CSV file to import
        #[arg(long)]
        file: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored answer keys
    ListKeys {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check an answer key for problems
    ValidateKey {
        /// Answer key: stored key name or path to a CSV file
        #[arg(long)]
        key: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Class statistics over recorded results
    Analytics {
        /// Pass mark as a share of the top score (default: from config)
        #[arg(long)]
        pass_ratio: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and an example key and sheet
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gradesheet=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            key,
            sheet,
            student,
            no_save,
            format,
            config,
        } => commands::grade::execute(key, sheet, student, no_save, format, config).await,
        Commands::Batch {
            key,
            sheets,
            parallelism,
            output,
            format,
            no_save,
            config,
        } => {
            commands::batch::execute(key, sheets, parallelism, output, format, no_save, config)
                .await
        }
        Commands::Segment { sheet, config } => commands::segment::execute(sheet, config).await,
        Commands::UploadKey { file, config } => commands::upload_key::execute(file, config),
        Commands::ListKeys { config } => commands::list_keys::execute(config),
        Commands::ValidateKey { key, config } => commands::validate_key::execute(key, config),
        Commands::Analytics { pass_ratio, config } => {
            commands::analytics::execute(pass_ratio, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
