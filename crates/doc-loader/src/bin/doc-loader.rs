//! doc-loader command line
//!
//! Run with: cargo run -p doc-loader --features cli -- run

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use doc_loader::ingestion::PdfHandler;
use doc_loader::types::OutcomeStatus;
use doc_loader::{DataLayout, IntakePipeline, LoaderConfig, ProcessingReport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "doc-loader")]
#[command(about = "Expand, classify and convert a raw drop directory to markdown")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Put raw/processed/originals under this directory instead
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Process everything currently in the raw directory
    Run,

    /// Empty data directories
    Reset {
        /// Only empty the processed directory
        #[arg(long)]
        processed: bool,

        /// Only empty the raw directory
        #[arg(long)]
        raw: bool,

        /// Only recreate the originals subdirectories
        #[arg(long)]
        originals: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.data = LoaderConfig::with_root(root).data;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run => {
            if config.pdf.enabled && !PdfHandler::new(config.pdf.clone()).is_available() {
                tracing::warn!("PDF analyzer '{}' not found; PDFs will fail", config.pdf.command);
            }
            let pipeline = IntakePipeline::new(config)?;
            let report = pipeline.process_intake()?;
            print_report(&report, cli.format)?;
            if report.failures().next().is_some() {
                std::process::exit(2);
            }
        }
        Commands::Reset {
            processed,
            raw,
            originals,
        } => {
            config.validate()?;
            let layout = DataLayout::new(&config.data);
            if !(processed || raw || originals) {
                layout.reset_all()?;
            } else {
                if processed {
                    layout.reset_processed()?;
                }
                if raw {
                    layout.reset_raw()?;
                }
                if originals {
                    for (name, dir) in layout.reset_originals()? {
                        tracing::debug!("Recreated {} -> {}", name, dir.display());
                    }
                }
            }
            println!("Reset complete");
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn print_report(report: &ProcessingReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            for outcome in &report.outcomes {
                let line = match &outcome.status {
                    OutcomeStatus::Processed { disposal } => format!("ok      {:?}", disposal),
                    OutcomeStatus::Skipped { reason } => format!("skipped {}", reason),
                    OutcomeStatus::Failed { stage, message } => format!("FAILED  [{}] {}", stage, message),
                };
                println!("{}  {}", outcome.path.display(), line);
            }
            println!(
                "\n{} processed, {} skipped, {} failed",
                report.processed().len(),
                report.skipped().count(),
                report.failures().count()
            );
        }
    }
    Ok(())
}
