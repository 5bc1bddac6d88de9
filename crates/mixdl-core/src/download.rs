//! Track download: resolve a video (searching when needed), then pull and
//! convert it to a tagged-ready MP3 via yt-dlp's audio extraction.
//!
//! One work unit covers the whole per-track pipeline, like the source
//! system: search (unless the payload carries a direct URL), download,
//! convert. Each stage failure is an item-level error; the batch carries on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::config::MixdlConfig;
use crate::scheduler::WorkExecutor;
use crate::search::TrackSearcher;
use crate::track::TrackDescriptor;
use crate::ytdlp::YtDlp;

/// A successfully downloaded track.
#[derive(Debug, Clone)]
pub struct DownloadedTrack {
    pub path: PathBuf,
    pub url: String,
    pub title: String,
}

/// yt-dlp argument list for one MP3 extraction.
pub fn download_args(url: &str, output_template: &Path) -> Vec<String> {
    vec![
        "--extract-audio".to_string(),
        "--audio-format".to_string(),
        "mp3".to_string(),
        "--audio-quality".to_string(),
        "0".to_string(),
        "--output".to_string(),
        output_template.to_string_lossy().into_owned(),
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
        url.to_string(),
    ]
}

/// Output template for a final filename: yt-dlp substitutes the extension
/// itself during audio extraction, so `Foo.mp3` becomes `Foo.%(ext)s`.
fn output_template(dir: &Path, mp3_name: &str) -> PathBuf {
    let stem = mp3_name.strip_suffix(".mp3").unwrap_or(mp3_name);
    dir.join(format!("{stem}.%(ext)s"))
}

/// Batch executor: search-if-needed, then download one track as MP3.
pub struct DownloadExecutor {
    searcher: TrackSearcher,
    ytdlp: YtDlp,
    out_dir: PathBuf,
    timeout: Duration,
    /// Prefix filenames with a zero-padded track number.
    numbered: bool,
    /// Batch size, for number padding.
    total: usize,
}

impl DownloadExecutor {
    pub fn new(
        ytdlp: YtDlp,
        cfg: &MixdlConfig,
        out_dir: impl Into<PathBuf>,
        numbered: bool,
        total: usize,
    ) -> Self {
        Self {
            searcher: TrackSearcher::new(ytdlp.clone(), cfg),
            ytdlp,
            out_dir: out_dir.into(),
            timeout: Duration::from_secs(cfg.download_timeout_secs),
            numbered,
            total,
        }
    }

    async fn download_one(&self, index: usize, track: &TrackDescriptor) -> Result<DownloadedTrack> {
        let (url, title) = match &track.url {
            Some(url) => (url.clone(), track.display_name()),
            None => {
                let hit = self.searcher.search(track).await.context("resolve track")?;
                (hit.url, hit.title)
            }
        };

        let filename = if self.numbered {
            track.numbered_mp3_filename(index, self.total)
        } else {
            track.mp3_filename()
        };
        let template = output_template(&self.out_dir, &filename);
        let final_path = self.out_dir.join(&filename);

        tracing::info!(%url, path = %final_path.display(), "downloading track");
        let args = download_args(&url, &template);
        self.ytdlp
            .run(&args, self.timeout)
            .await
            .with_context(|| format!("download {url}"))?;

        if !tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
            bail!("yt-dlp reported success but {} was not written", final_path.display());
        }
        Ok(DownloadedTrack {
            path: final_path,
            url,
            title,
        })
    }
}

#[async_trait]
impl WorkExecutor for DownloadExecutor {
    type Payload = TrackDescriptor;
    type Value = DownloadedTrack;

    async fn execute(&self, index: usize, track: TrackDescriptor) -> Result<DownloadedTrack> {
        self.download_one(index, &track).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_match_audio_extraction_contract() {
        let args = download_args("https://y/v1", Path::new("/tmp/out/A - B.%(ext)s"));
        assert_eq!(
            args,
            vec![
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "0",
                "--output",
                "/tmp/out/A - B.%(ext)s",
                "--no-warnings",
                "--no-playlist",
                "https://y/v1",
            ]
        );
    }

    #[test]
    fn template_swaps_extension_placeholder() {
        let t = output_template(Path::new("/music"), "A - B.mp3");
        assert_eq!(t, PathBuf::from("/music/A - B.%(ext)s"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn executor_verifies_the_written_file() {
        use std::os::unix::fs::PermissionsExt;

        // Fake yt-dlp: touches the --output path with the mp3 extension.
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-yt-dlp");
        std::fs::write(
            &bin,
            "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--output\" ]; then\n    shift\n    out=$(printf '%s' \"$1\" | sed 's/%(ext)s/mp3/')\n    : > \"$out\"\n  fi\n  shift\ndone\n",
        )
        .unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let out_dir = dir.path().join("music");
        std::fs::create_dir(&out_dir).unwrap();

        let cfg = MixdlConfig::default();
        let exec = DownloadExecutor::new(YtDlp::new(&bin), &cfg, &out_dir, false, 1);
        let track = {
            let mut t = TrackDescriptor::named("A", "B");
            t.url = Some("https://www.youtube.com/watch?v=x".to_string());
            t
        };
        let done = exec.execute(0, track).await.unwrap();
        assert_eq!(done.path, out_dir.join("A - B.mp3"));
        assert!(done.path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_output_file_is_an_item_error() {
        use std::os::unix::fs::PermissionsExt;

        // Fake yt-dlp that exits 0 without writing anything.
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-yt-dlp");
        std::fs::write(&bin, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cfg = MixdlConfig::default();
        let exec = DownloadExecutor::new(YtDlp::new(&bin), &cfg, dir.path(), false, 1);
        let track = {
            let mut t = TrackDescriptor::named("A", "B");
            t.url = Some("https://www.youtube.com/watch?v=x".to_string());
            t
        };
        let err = exec.execute(0, track).await.unwrap_err();
        assert!(err.to_string().contains("was not written"), "got: {err}");
    }
}
