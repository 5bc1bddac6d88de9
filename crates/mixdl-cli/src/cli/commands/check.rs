//! `mixdl check` probe the yt-dlp binary.

use anyhow::{Context, Result};
use mixdl_core::config::MixdlConfig;
use mixdl_core::ytdlp::YtDlp;

pub async fn run_check(cfg: &MixdlConfig) -> Result<()> {
    let ytdlp = YtDlp::from_config(cfg);
    let version = ytdlp
        .version()
        .await
        .context("yt-dlp is not available (install it or set yt_dlp_path in the config)")?;
    println!("yt-dlp {version}");
    Ok(())
}
