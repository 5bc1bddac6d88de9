//! Control socket: server (during `mixdl search`/`mixdl download`) and
//! client (for `mixdl limit`). Protocol: one line per command: "limit <n>".

use anyhow::Result;
use mixdl_core::control::ControlCommand;
use mixdl_core::scheduler::CapacityHandle;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

/// Spawns a task that listens on `path` and applies each "limit <n>" line to
/// `capacity`. Ignores malformed lines.
pub fn spawn_control_listener(
    capacity: CapacityHandle,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    let handle = tokio::spawn(async move {
        let _ = std::fs::remove_file(&path);
        let listener = match UnixListener::bind(&path) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(path = %path.display(), "control socket bind: {}", e);
                return;
            }
        };
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let capacity = capacity.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            match ControlCommand::parse(&line) {
                                Some(ControlCommand::Limit(n)) => {
                                    tracing::info!("concurrency limit set to {} via socket", n);
                                    capacity.set(n);
                                }
                                None => tracing::debug!("ignoring control line: {:?}", line),
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends "limit <n>\n" to the control socket of a running batch.
pub async fn send_limit(socket_path: &Path, n: usize) -> Result<()> {
    let mut stream = tokio::net::UnixStream::connect(socket_path).await?;
    let msg = format!("{}\n", ControlCommand::Limit(n));
    tokio::io::AsyncWriteExt::write_all(&mut stream, msg.as_bytes()).await?;
    Ok(())
}
