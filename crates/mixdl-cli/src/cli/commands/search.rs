//! `mixdl search <file>` search each track and print its best match.

use anyhow::Result;
use mixdl_core::config::MixdlConfig;
use mixdl_core::scheduler::{run_batch, CapacityHandle};
use mixdl_core::search::{SearchExecutor, TrackSearcher};
use mixdl_core::track::TrackDescriptor;
use mixdl_core::ytdlp::YtDlp;
use std::sync::Arc;

use crate::cli::control_socket;
use crate::cli::reporter::PrintReporter;

pub async fn run_search(cfg: &MixdlConfig, tracks: Vec<TrackDescriptor>) -> Result<()> {
    let labels: Vec<String> = tracks.iter().map(TrackDescriptor::display_name).collect();
    let searcher = TrackSearcher::new(YtDlp::from_config(cfg), cfg);
    let executor = Arc::new(SearchExecutor::new(searcher));

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
            Ok(hit) => {
                let secs = hit.duration.map(|d| format!(" [{}s]", d.round() as u64));
                println!(
                    "{}: {}{}",
                    labels[outcome.index],
                    hit.url,
                    secs.unwrap_or_default()
                );
            }
            Err(e) => println!("{}: no match ({:#})", labels[outcome.index], e),
        }
    }
    println!("{} resolved, {} failed", report.succeeded, report.failed);
    Ok(())
}
