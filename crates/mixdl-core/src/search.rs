//! YouTube search via `yt-dlp ytsearchN:` with duration-aware ranking.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::MixdlConfig;
use crate::scheduler::WorkExecutor;
use crate::track::TrackDescriptor;
use crate::ytdlp::YtDlp;

/// One candidate video from a search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "webpage_url")]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
}

impl SearchHit {
    /// Thumbnail derived from the video id; yt-dlp's flat listing often
    /// omits one.
    pub fn thumbnail_url(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", self.id)
    }
}

/// Parse yt-dlp `--dump-json` output: one JSON object per line. Lines that
/// are not valid JSON or lack id/url/duration are skipped, mirroring how
/// loosely yt-dlp mixes diagnostics into its output.
pub fn parse_search_output(stdout: &str) -> Vec<SearchHit> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<SearchHit>(line).ok())
        .filter(|hit| !hit.id.is_empty() && !hit.url.is_empty() && hit.duration.is_some())
        .collect()
}

/// Pick the best candidate for an expected track length.
///
/// Each candidate gets a duration score (its absolute length difference,
/// normalized to 0..=10 across the candidate set) plus its search rank;
/// lowest total wins. Without an expected duration the top-ranked hit wins
/// outright.
pub fn select_best_match(hits: &[SearchHit], expected_duration_secs: Option<u64>) -> Option<&SearchHit> {
    let first = hits.first()?;
    let Some(expected) = expected_duration_secs else {
        return Some(first);
    };
    let expected = expected as f64;

    let diffs: Vec<f64> = hits
        .iter()
        .map(|h| (h.duration.unwrap_or(0.0) - expected).abs())
        .collect();
    let max_diff = diffs.iter().cloned().fold(0.0_f64, f64::max);

    let mut best = 0;
    let mut best_score = f64::MAX;
    for (rank, diff) in diffs.iter().enumerate() {
        let duration_score = if max_diff > 0.0 { diff / max_diff * 10.0 } else { 0.0 };
        let score = duration_score + rank as f64;
        if score < best_score {
            best_score = score;
            best = rank;
        }
    }
    hits.get(best)
}

/// Searches one track and returns the best-matching video.
#[derive(Debug, Clone)]
pub struct TrackSearcher {
    ytdlp: YtDlp,
    results: usize,
    timeout: Duration,
}

impl TrackSearcher {
    pub fn new(ytdlp: YtDlp, cfg: &MixdlConfig) -> Self {
        Self {
            ytdlp,
            results: cfg.search_results.max(1),
            timeout: Duration::from_secs(cfg.search_timeout_secs),
        }
    }

    pub async fn search(&self, track: &TrackDescriptor) -> Result<SearchHit> {
        let query = track.search_query();
        if query.is_empty() {
            bail!("empty search query");
        }
        let args = vec![
            "--dump-json".to_string(),
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            format!("ytsearch{}:{query}", self.results),
        ];
        let out = self.ytdlp.run(&args, self.timeout).await?;
        let hits = parse_search_output(&out.stdout);
        match select_best_match(&hits, track.duration_secs) {
            Some(hit) => {
                tracing::debug!(query, url = %hit.url, title = %hit.title, "search hit");
                Ok(hit.clone())
            }
            None => bail!("no match found for \"{query}\""),
        }
    }
}

/// Batch executor: one search per work item.
pub struct SearchExecutor {
    searcher: TrackSearcher,
}

impl SearchExecutor {
    pub fn new(searcher: TrackSearcher) -> Self {
        Self { searcher }
    }
}

#[async_trait]
impl WorkExecutor for SearchExecutor {
    type Payload = TrackDescriptor;
    type Value = SearchHit;

    async fn execute(&self, _index: usize, track: TrackDescriptor) -> Result<SearchHit> {
        self.searcher.search(&track).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, duration: f64) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
            title: format!("video {id}"),
            uploader: None,
            duration: Some(duration),
            view_count: None,
        }
    }

    #[test]
    fn parses_json_lines_and_skips_noise() {
        let stdout = concat!(
            r#"{"id":"a1","webpage_url":"https://y/a1","title":"A","duration":180.0}"#,
            "\n",
            "WARNING: something from yt-dlp\n",
            r#"{"id":"","webpage_url":"https://y/x","title":"no id","duration":10.0}"#,
            "\n",
            r#"{"id":"b2","webpage_url":"https://y/b2","title":"B","duration":200.5,"uploader":"chan"}"#,
            "\n",
        );
        let hits = parse_search_output(stdout);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a1");
        assert_eq!(hits[1].uploader.as_deref(), Some("chan"));
    }

    #[test]
    fn entries_without_duration_are_dropped() {
        let stdout = r#"{"id":"a1","webpage_url":"https://y/a1","title":"A"}"#;
        assert!(parse_search_output(stdout).is_empty());
    }

    #[test]
    fn without_expected_duration_top_rank_wins() {
        let hits = vec![hit("a", 500.0), hit("b", 180.0)];
        let best = select_best_match(&hits, None).unwrap();
        assert_eq!(best.id, "a");
    }

    #[test]
    fn close_duration_beats_rank() {
        // Expected 180s: rank 0 is wildly long, rank 1 is a near-exact
        // match, so the duration term (0..=10) dominates the 1-point rank.
        let hits = vec![hit("a", 2000.0), hit("b", 182.0)];
        let best = select_best_match(&hits, Some(180)).unwrap();
        assert_eq!(best.id, "b");
    }

    #[test]
    fn equal_durations_fall_back_to_rank() {
        let hits = vec![hit("a", 180.0), hit("b", 180.0), hit("c", 180.0)];
        let best = select_best_match(&hits, Some(180)).unwrap();
        assert_eq!(best.id, "a");
    }

    #[test]
    fn empty_candidate_set_has_no_match() {
        assert!(select_best_match(&[], Some(100)).is_none());
        assert!(select_best_match(&[], None).is_none());
    }

    #[test]
    fn thumbnail_from_id() {
        let h = hit("xyz", 1.0);
        assert_eq!(h.thumbnail_url(), "https://i.ytimg.com/vi/xyz/maxresdefault.jpg");
    }
}
