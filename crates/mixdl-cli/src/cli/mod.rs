//! CLI for the mixdl track fetcher.

mod commands;
pub mod control_socket;
mod reporter;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mixdl_core::config;
use mixdl_core::track::{self, TrackDescriptor};
use std::path::{Path, PathBuf};

use commands::{run_check, run_download, run_limit, run_search};

/// Top-level CLI for the mixdl track fetcher.
#[derive(Debug, Parser)]
#[command(name = "mixdl")]
#[command(about = "mixdl: concurrent track search and MP3 download via yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve each track in a list file to its best YouTube match.
    Search {
        /// Track list: one "Artist - Title" or YouTube URL per line.
        file: PathBuf,

        /// Resolve up to N tracks concurrently (overrides the config file).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Milliseconds between successive admissions (overrides the config file).
        #[arg(long, value_name = "MS")]
        stagger_ms: Option<u64>,
    },

    /// Download every track in a list file as MP3.
    Download {
        /// Track list: one "Artist - Title" or YouTube URL per line.
        file: PathBuf,

        /// Output directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Prefix filenames with a zero-padded track number.
        #[arg(long)]
        numbered: bool,

        /// Download up to N tracks concurrently (overrides the config file).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Milliseconds between successive admissions (overrides the config file).
        #[arg(long, value_name = "MS")]
        stagger_ms: Option<u64>,
    },

    /// Change the concurrency limit of a running batch.
    Limit {
        /// New limit. 0 pauses admissions until raised again.
        n: usize,
    },

    /// Check that yt-dlp is available.
    Check,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Search { file, jobs, stagger_ms } => {
                apply_overrides(&mut cfg, jobs, stagger_ms);
                let tracks = load_tracks(&file).await?;
                run_search(&cfg, tracks).await?;
            }
            CliCommand::Download { file, out, numbered, jobs, stagger_ms } => {
                apply_overrides(&mut cfg, jobs, stagger_ms);
                let tracks = load_tracks(&file).await?;
                let out_dir = match out {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_download(&cfg, tracks, &out_dir, numbered).await?;
            }
            CliCommand::Limit { n } => run_limit(n).await?,
            CliCommand::Check => run_check(&cfg).await?,
        }

        Ok(())
    }
}

fn apply_overrides(cfg: &mut config::MixdlConfig, jobs: Option<usize>, stagger_ms: Option<u64>) {
    if let Some(jobs) = jobs {
        cfg.max_concurrency = jobs;
    }
    if let Some(ms) = stagger_ms {
        cfg.stagger_delay_ms = ms;
    }
}

async fn load_tracks(path: &Path) -> Result<Vec<TrackDescriptor>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read track list {}", path.display()))?;
    let tracks = track::parse_track_list(&text)?;
    if tracks.is_empty() {
        anyhow::bail!("{} contains no tracks", path.display());
    }
    Ok(tracks)
}
