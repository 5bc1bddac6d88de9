//! Thin wrapper around the `yt-dlp` binary.
//!
//! Every external operation in this crate goes through one subprocess
//! invocation with a hard timeout; processes are killed on timeout or when
//! the owning future is dropped. Non-zero exits become errors carrying the
//! captured stderr so item failures stay diagnosable.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

/// Captured result of one completed yt-dlp invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Handle to a yt-dlp installation.
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: PathBuf,
}

impl YtDlp {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve via `$PATH` unless the config pins an explicit binary.
    pub fn from_config(cfg: &crate::config::MixdlConfig) -> Self {
        match &cfg.yt_dlp_path {
            Some(path) => Self::new(path.clone()),
            None => Self::default(),
        }
    }

    /// Run yt-dlp with `args`, killing it if `timeout` elapses first.
    pub async fn run(&self, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        tracing::debug!(bin = %self.path.display(), ?args, "spawning yt-dlp");
        let mut child = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawn {}", self.path.display()))?;

        let stdout = child.stdout.take().expect("stdout piped");
        let stderr = child.stderr.take().expect("stderr piped");
        let stdout_task = tokio::spawn(read_to_string(stdout));
        let stderr_task = tokio::spawn(read_to_string(stderr));

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(waited) => waited.context("wait for yt-dlp")?,
            Err(_elapsed) => {
                child.kill().await.ok();
                bail!("yt-dlp timed out after {}s", timeout.as_secs());
            }
        };

        let stdout = stdout_task.await.context("join stdout reader")??;
        let stderr = stderr_task.await.context("join stderr reader")??;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            bail!("yt-dlp failed with code {code}: {}", stderr.trim());
        }
        Ok(CommandOutput { stdout, stderr })
    }

    /// Availability probe; returns the installed version string.
    pub async fn version(&self) -> Result<String> {
        let out = self
            .run(&["--version".to_string()], Duration::from_secs(15))
            .await?;
        Ok(out.stdout.trim().to_string())
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

async fn read_to_string(mut reader: impl tokio::io::AsyncRead + Unpin) -> Result<String> {
    use tokio::io::AsyncReadExt;
    let mut buf = String::new();
    reader.read_to_string(&mut buf).await.context("read yt-dlp output")?;
    Ok(buf)
}
