use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/mixdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixdlConfig {
    /// Maximum concurrently active batch items (the initial capacity; the
    /// control socket can change it while a batch runs).
    pub max_concurrency: usize,
    /// Delay in milliseconds between successive admissions, smoothing the
    /// request rate against YouTube.
    pub stagger_delay_ms: u64,
    /// Candidates fetched per search query (`ytsearchN:`).
    pub search_results: usize,
    /// Hard timeout for one search invocation.
    pub search_timeout_secs: u64,
    /// Hard timeout for one download-and-convert invocation.
    pub download_timeout_secs: u64,
    /// Explicit yt-dlp binary; `$PATH` lookup when unset.
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,
}

impl Default for MixdlConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            stagger_delay_ms: 2000,
            search_results: 10,
            search_timeout_secs: 30,
            download_timeout_secs: 600,
            yt_dlp_path: None,
        }
    }
}

impl MixdlConfig {
    pub fn stagger_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.stagger_delay_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mixdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MixdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MixdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MixdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MixdlConfig::default();
        assert_eq!(cfg.max_concurrency, 5);
        assert_eq!(cfg.stagger_delay_ms, 2000);
        assert_eq!(cfg.search_results, 10);
        assert_eq!(cfg.search_timeout_secs, 30);
        assert_eq!(cfg.download_timeout_secs, 600);
        assert!(cfg.yt_dlp_path.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MixdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MixdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.max_concurrency, cfg.max_concurrency);
        assert_eq!(parsed.stagger_delay_ms, cfg.stagger_delay_ms);
        assert_eq!(parsed.search_results, cfg.search_results);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            max_concurrency = 3
            stagger_delay_ms = 500
            search_results = 5
            search_timeout_secs = 20
            download_timeout_secs = 120
            yt_dlp_path = "/opt/yt-dlp"
        "#;
        let cfg: MixdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_concurrency, 3);
        assert_eq!(cfg.stagger_delay_ms, 500);
        assert_eq!(cfg.stagger_delay(), std::time::Duration::from_millis(500));
        assert_eq!(
            cfg.yt_dlp_path.as_deref(),
            Some(std::path::Path::new("/opt/yt-dlp"))
        );
    }
}
