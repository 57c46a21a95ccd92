//! CLI tool for downloading presentations and extracting their text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pptxer_core::{ScraperConfig, DEFAULT_CONFIG_FILE};
use pptxer_extract::{extract_presentations_texts, ExtractOptions, ExtractionOutput};
use pptxer_scraper::{DownloadSettings, DuckDuckGoSearch, HttpFetcher, PresentationDownloader};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Search the web for presentations, download them and extract slide text.
#[derive(Parser, Debug)]
#[command(name = "pptxer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file, created with defaults when missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where to write the extracted text (default: presentations_text_<timestamp>.json)
    #[arg(long, global = true)]
    extracted_text_dst: Option<PathBuf>,

    /// Group results per input path instead of one flat array
    #[arg(long, global = true)]
    no_single_array: bool,

    /// Hoist slide fields and statistics to the top level of each result
    #[arg(long, global = true)]
    flatten: bool,

    /// Log level
    #[arg(short, long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for presentations, download them and extract their text
    Download {
        /// Search keywords (default: searchKeywords from the config file)
        keywords: Vec<String>,

        /// Download directory (default: downloadDirectory from the config file)
        #[arg(long)]
        dst: Option<PathBuf>,

        /// Download cache file (default: from the config file)
        #[arg(long, conflicts_with = "no_cache")]
        cache_file: Option<PathBuf>,

        /// Do not read or record the download cache
        #[arg(long)]
        no_cache: bool,

        /// Only download, print the downloaded paths
        #[arg(long)]
        no_extract_text: bool,
    },

    /// Extract text from presentation files or directories
    Extract {
        /// Input .pptx file(s) or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        LogLevel::Debug.as_filter()
    } else {
        args.log_level.as_filter()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let options = ExtractOptions {
        single_array_result: !args.no_single_array,
        flatten_fields: args.flatten,
        output_file_path: args.extracted_text_dst.clone(),
    };

    match &args.command {
        Command::Download {
            keywords,
            dst,
            cache_file,
            no_cache,
            no_extract_text,
        } => {
            let config = ScraperConfig::load_or_create(&args.config)
                .with_context(|| format!("Failed to load config {}", args.config.display()))?;
            let keywords = if keywords.is_empty() {
                config.search_keywords.clone()
            } else {
                keywords.clone()
            };
            let dst = dst.as_deref().unwrap_or(config.download_directory.as_path());
            let cache_file = if *no_cache {
                None
            } else {
                cache_file
                    .as_deref()
                    .or(config.presentations_download_cache_file_path.as_deref())
            };

            let downloaded = download(&config, &keywords, dst, cache_file)?;
            if *no_extract_text {
                for path in &downloaded {
                    println!("{}", path.display());
                }
                return Ok(());
            }
            if downloaded.is_empty() {
                println!("No presentations were downloaded, nothing to extract");
                return Ok(());
            }
            extract(&downloaded, &options)
        }
        Command::Extract { paths } => extract(paths, &options),
    }
}

/// Run the scraper with clients built from the config file.
fn download(
    config: &ScraperConfig,
    keywords: &[String],
    dst: &Path,
    cache_file: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let search = DuckDuckGoSearch::new(timeout).context("Failed to create search client")?;
    let fetcher = HttpFetcher::new(timeout).context("Failed to create HTTP client")?;
    let downloader =
        PresentationDownloader::new(search, fetcher).with_settings(DownloadSettings::from(config));

    let paths = downloader
        .scrape_presentations_to_dir(keywords, Some(dst), cache_file)
        .context("Download failed")?;
    log::info!("Downloaded {} presentations to {}", paths.len(), dst.display());
    Ok(paths)
}

/// Extract and report where the result went.
fn extract(paths: &[PathBuf], options: &ExtractOptions) -> Result<()> {
    let output = extract_presentations_texts(paths, options).context("Extraction failed")?;

    match &options.output_file_path {
        Some(dst) => println!(
            "Extracted text of {} presentations to {}",
            output.len(),
            dst.display()
        ),
        None => print_output(&output)?,
    }

    Ok(())
}

fn print_output(output: &ExtractionOutput) -> Result<()> {
    let json =
        serde_json::to_string_pretty(output).context("Failed to serialize extraction output")?;
    println!("{}", json);
    Ok(())
}
