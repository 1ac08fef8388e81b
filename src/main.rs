//! Edition transcoder
//!
//! Finds the MP3 and 16-bit FLAC variants missing from a release's edition
//! in the remote catalogue, produces them with sox and flac2mp3, packages
//! each as a private torrent and submits them together in one upload.

mod catalogue;
mod config;
mod config_file;
mod edition;
mod error;
mod naming;
mod origin;
mod package;
mod pipeline;
mod plan;
mod probe;
mod release;
mod transcode;
mod validation;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalogue::HttpCatalogue;
use crate::config::RunConfig;
use crate::config_file::ConfigFile;
use crate::error::{Result, TranscodeError};
use crate::package::Mktorrent;
use crate::pipeline::Pipeline;
use crate::probe::FfmpegProber;
use crate::transcode::ToolTranscoder;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "edition-transcoder";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Release directories, each holding an origin.yaml
    #[arg(required = true)]
    dirs: Vec<PathBuf>,

    /// Catalogue API key
    #[arg(long, env = "RED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Announce URL for the created torrents
    #[arg(short, long)]
    announce: Option<String>,

    /// Directory the transcodes are written to
    #[arg(short, long)]
    transcode_dir: Option<PathBuf>,

    /// Directory the torrent files are written to
    #[arg(short = 'o', long)]
    torrent_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalogue API endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Plan only: no transcoding, packaging or upload
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    match run(&args.dirs, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file first, then command line flags on top
fn load_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigFile::from_file(path)
            .map_err(|e| {
                TranscodeError::Config(format!("failed to load {}: {}", path.display(), e))
            })?
            .into_run_config(),
        None => RunConfig::default(),
    };

    if let Some(key) = &args.api_key {
        config.catalogue.api_key = Some(key.clone());
    }
    if let Some(url) = &args.api_url {
        config.catalogue.api_url = url.clone();
    }
    if let Some(announce) = &args.announce {
        config.torrent.announce = Some(announce.clone());
    }
    if let Some(dir) = &args.transcode_dir {
        config.transcode_dir = dir.clone();
    }
    if let Some(dir) = &args.torrent_dir {
        config.torrent_dir = dir.clone();
    }
    config.dry_run |= args.dry_run;

    config.validate()?;
    Ok(config)
}

/// Process every directory; false if any of them failed
async fn run(dirs: &[PathBuf], config: &RunConfig) -> Result<bool> {
    probe::init()?;

    let catalogue = HttpCatalogue::new(&config.catalogue.api_url, config.api_key()?)?;
    let packager = Mktorrent::new(
        config.tools.mktorrent.clone(),
        config.announce()?,
        &config.torrent,
    );
    let transcoder = ToolTranscoder::new(config.tools.clone());
    let pipeline = Pipeline::new(FfmpegProber, transcoder, packager, catalogue, config);

    let report = pipeline.run_batch(dirs).await;
    for (dir, reason) in &report.failures {
        tracing::error!("{:?}: {}", dir, reason);
    }
    Ok(report.is_success())
}

/// Initialize logging with tracing
fn init_logging(config: &RunConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("edition_transcoder={}", config.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
