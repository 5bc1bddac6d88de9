//! `mixdl limit <n>` retune the concurrency of a running batch.

use anyhow::{Context, Result};

use crate::cli::control_socket;

pub async fn run_limit(n: usize) -> Result<()> {
    let path = mixdl_core::control::default_control_socket_path()
        .context("locate control socket")?;
    if !path.exists() {
        println!("No running batch (control socket not found).");
        return Ok(());
    }
    control_socket::send_limit(&path, n)
        .await
        .context("send limit command")?;
    println!("Concurrency limit set to {n}");
    Ok(())
}
