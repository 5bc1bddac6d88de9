//! `mixdl download <file>` download every track in the list as MP3.

use anyhow::{Context, Result};
use mixdl_core::config::MixdlConfig;
use mixdl_core::download::DownloadExecutor;
use mixdl_core::scheduler::{run_batch, CapacityHandle};
use mixdl_core::track::TrackDescriptor;
use mixdl_core::ytdlp::YtDlp;
use std::path::Path;
use std::sync::Arc;

use crate::cli::control_socket;
use crate::cli::reporter::PrintReporter;

pub async fn run_download(
    cfg: &MixdlConfig,
    tracks: Vec<TrackDescriptor>,
    out_dir: &Path,
    numbered: bool,
) -> Result<()> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let labels: Vec<String> = tracks.iter().map(TrackDescriptor::display_name).collect();
    let total = tracks.len();
    let executor = Arc::new(DownloadExecutor::new(
        YtDlp::from_config(cfg),
        cfg,
        out_dir,
        numbered,
        total,
    ));

    let capacity = CapacityHandle::new(cfg.max_concurrency);
    let listener = mixdl_core::control::default_control_socket_path()
        .ok()
        .and_then(|path| {
            let handle = control_socket::spawn_control_listener(capacity.clone(), &path).ok()?;
            tracing::debug!(path = %path.display(), "control socket listening");
            Some((handle, path))
        });

    let reporter = Arc::new(PrintReporter::new(labels.clone()));
    let report = run_batch(executor, tracks, &capacity, cfg.stagger_delay(), reporter).await?;

    if let Some((handle, path)) = listener {
        handle.abort();
        let _ = std::fs::remove_file(path);
    }

    println!();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(dl) => println!("{}: {}", labels[outcome.index], dl.path.display()),
            Err(e) => println!("{}: FAILED ({:#})", labels[outcome.index], e),
        }
    }
    println!("{} downloaded, {} failed", report.succeeded, report.failed);

    if report.succeeded == 0 && report.failed > 0 {
        anyhow::bail!("all {} download(s) failed", report.failed);
    }
    Ok(())
}
