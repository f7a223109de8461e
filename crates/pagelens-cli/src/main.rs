//! Pagelens command-line interface.
//!
//! ```text
//! pagelens process scan.pdf
//! pagelens search scan.pdf invoice --format json
//! pagelens cache stats
//! pagelens cache clear
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pagelens::core::config::PagelensConfig;
use pagelens::ocr::TesseractCli;
use pagelens::processor::ProcessingEvent;
use pagelens::session::Session;
use pagelens::{DocumentCache, SearchResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pagelens")]
#[command(about = "OCR scanned PDFs and search them with highlight coordinates")]
#[command(version)]
struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to a discovered pagelens.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR every page of a PDF and store the result in the cache
    Process {
        pdf: PathBuf,
        /// OCR even if a cached result exists
        #[arg(long)]
        force: bool,
        /// Tesseract language(s), e.g. "eng" or "deu+eng"
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Search a PDF for a keyword, processing it first on a cache miss
    Search {
        pdf: PathBuf,
        keyword: String,
        /// Fail instead of running OCR when the document is not cached
        #[arg(long)]
        cached_only: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Inspect or empty the document cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show entry count and size
    Stats {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Delete every cache entry
    Clear,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "pagelens=debug" } else { "pagelens=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Process { pdf, force, language } => {
            let mut config = config;
            if let Some(language) = language {
                config.ocr.language = language;
            }
            let mut session = Session::new(config).context("Failed to initialize session")?;
            let cached = load(&mut session, &pdf)?;
            if cached && !force {
                eprintln!("Already processed; use --force to run OCR again");
                return Ok(());
            }
            process(&mut session).await?;
            let pages = session.index().map(|index| index.page_count()).unwrap_or(0);
            println!("Processed {} ({} pages)", pdf.display(), pages);
        }
        Commands::Search {
            pdf,
            keyword,
            cached_only,
            format,
        } => {
            if keyword.is_empty() {
                bail!("Please enter a search term");
            }
            let mut session = Session::new(config).context("Failed to initialize session")?;
            if !load(&mut session, &pdf)? {
                if cached_only {
                    bail!("{} has not been processed yet", pdf.display());
                }
                process(&mut session).await?;
            }
            print_results(&session.search(&keyword), format)?;
        }
        Commands::Cache { command } => {
            let cache = DocumentCache::new(config.cache_dir.clone()).context("Failed to open cache")?;
            match command {
                CacheCommands::Stats { format } => {
                    let stats = cache.stats()?;
                    match format {
                        OutputFormat::Text => {
                            println!("Cache directory: {}", cache.cache_dir().display());
                            println!("Entries: {}", stats.total_files);
                            println!("Size: {:.2} MB", stats.total_size_mb);
                        }
                        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                    }
                }
                CacheCommands::Clear => {
                    let removed = cache.clear()?;
                    println!("Removed {} cache entries", removed);
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PagelensConfig> {
    match path {
        Some(path) => PagelensConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(PagelensConfig::discover()?.unwrap_or_default()),
    }
}

/// Load `pdf` into the session; returns whether the index came from the cache.
fn load(session: &mut Session, pdf: &Path) -> Result<bool> {
    let outcome = session
        .load_document(pdf)
        .map_err(|e| anyhow::anyhow!("Error loading PDF: {}", e))?;
    eprintln!("{}", outcome.status_message());
    Ok(outcome.cache_hit)
}

async fn process(session: &mut Session) -> Result<()> {
    let backend = TesseractCli::from_config(&session.config().ocr);
    if !backend.is_available() {
        bail!(
            "{} could not be started; install tesseract-ocr or set ocr.tesseract_path",
            backend.binary().display()
        );
    }

    let handle = session.process_document(Arc::new(backend))?;
    let index = handle
        .wait_with(|event| match event {
            ProcessingEvent::Progress { completed, total } => {
                let percentage = completed as f64 / total.max(1) as f64 * 100.0;
                eprintln!("Processing page {} of {} ({:.1}%)", completed, total, percentage);
            }
            ProcessingEvent::Status(message) => eprintln!("{}", message),
        })
        .await?;

    session.finish_processing(index)?;
    Ok(())
}

fn print_results(results: &[SearchResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(results)?),
        OutputFormat::Text => {
            if results.is_empty() {
                println!("No matches");
            }
            for result in results {
                let b = result.bbox;
                println!(
                    "Page {} @ {}: {}  [{:.1}, {:.1}, {:.1}, {:.1}]",
                    result.page, result.position, result.context, b.x0, b.y0, b.x1, b.y1
                );
            }
        }
    }
    Ok(())
}
