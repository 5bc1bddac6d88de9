//! Track descriptors: the work-item payload for search and download batches.
//!
//! A track list is plain text, one track per line, either `Artist - Title`
//! or a direct `http(s)` URL. Blank lines and `#` comments are skipped.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// One unit of work: a track to locate and/or download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub artist: String,
    pub title: String,
    /// Expected length, used to rank search results when known.
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Direct source URL; when set, search is skipped for this track.
    #[serde(default)]
    pub url: Option<String>,
}

impl TrackDescriptor {
    pub fn named(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            duration_secs: None,
            url: None,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            artist: String::new(),
            title: String::new(),
            duration_secs: None,
            url: Some(url.into()),
        }
    }

    /// Query text handed to the search backend.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.artist, self.title).trim().to_string()
    }

    /// Human-readable name for logs and progress lines.
    pub fn display_name(&self) -> String {
        if !self.artist.is_empty() || !self.title.is_empty() {
            format!("{} - {}", self.artist, self.title)
        } else {
            self.url.clone().unwrap_or_default()
        }
    }

    /// Output filename, `Artist - Title.mp3`, sanitized for the filesystem.
    pub fn mp3_filename(&self) -> String {
        let artist = sanitize_component(&self.artist, "Unknown Artist");
        let title = sanitize_component(&self.title, "Unknown Title");
        format!("{artist} - {title}.mp3")
    }

    /// Output filename with a zero-padded track number prefix, padded to the
    /// batch size (minimum two digits): `01 - Artist - Title.mp3`.
    pub fn numbered_mp3_filename(&self, index: usize, total: usize) -> String {
        let padding = total.to_string().len().max(2);
        let number = format!("{:0padding$}", index + 1, padding = padding);
        format!("{number} - {}", self.mp3_filename())
    }
}

/// Sanitize one filename component: swap characters that are unsafe on
/// common filesystems for `_`, collapse whitespace runs, and fall back to a
/// placeholder when nothing printable remains.
fn sanitize_component(raw: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '*' | '?' => out.push('_'),
            c if c.is_control() => out.push('_'),
            c => out.push(c),
        }
    }
    let trimmed = out.trim_matches(['.', ' ']);
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a whole track-list file. Errors name the offending line.
pub fn parse_track_list(text: &str) -> Result<Vec<TrackDescriptor>> {
    let mut tracks = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let track = parse_track_line(line).with_context(|| format!("line {}", lineno + 1))?;
        tracks.push(track);
    }
    Ok(tracks)
}

/// Parse one non-empty track line: a direct URL or `Artist - Title`.
pub fn parse_track_line(line: &str) -> Result<TrackDescriptor> {
    if line.starts_with("http://") || line.starts_with("https://") {
        let parsed = url::Url::parse(line).with_context(|| format!("invalid URL: {line}"))?;
        if parsed.host_str().is_none() {
            bail!("URL has no host: {line}");
        }
        return Ok(TrackDescriptor::from_url(line));
    }
    match line.split_once(" - ") {
        Some((artist, title)) => Ok(TrackDescriptor::named(artist.trim(), title.trim())),
        // No separator: treat the whole line as a title-only query.
        None => Ok(TrackDescriptor::named("", line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_artist_title_lines() {
        let t = parse_track_line("Nina Simone - Feeling Good").unwrap();
        assert_eq!(t.artist, "Nina Simone");
        assert_eq!(t.title, "Feeling Good");
        assert!(t.url.is_none());
        assert_eq!(t.search_query(), "Nina Simone Feeling Good");
    }

    #[test]
    fn parses_direct_url_lines() {
        let t = parse_track_line("https://www.youtube.com/watch?v=abc123").unwrap();
        assert_eq!(t.url.as_deref(), Some("https://www.youtube.com/watch?v=abc123"));
        assert!(t.artist.is_empty());
    }

    #[test]
    fn rejects_malformed_url_lines() {
        assert!(parse_track_line("https://:not a url").is_err());
    }

    #[test]
    fn title_only_line_becomes_query() {
        let t = parse_track_line("Feeling Good").unwrap();
        assert_eq!(t.artist, "");
        assert_eq!(t.title, "Feeling Good");
        assert_eq!(t.search_query(), "Feeling Good");
    }

    #[test]
    fn track_list_skips_blanks_and_comments() {
        let text = "# my mix\n\nA - B\n  \nC - D\n";
        let tracks = parse_track_list(text).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "B");
        assert_eq!(tracks[1].artist, "C");
    }

    #[test]
    fn track_list_error_names_the_line() {
        let err = parse_track_list("A - B\nhttps://\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn mp3_filename_is_sanitized() {
        let t = TrackDescriptor::named("AC/DC", "Back  in\tBlack?");
        assert_eq!(t.mp3_filename(), "AC_DC - Back in Black_.mp3");
    }

    #[test]
    fn mp3_filename_falls_back_when_empty() {
        let t = TrackDescriptor::named("", "???");
        assert_eq!(t.mp3_filename(), "Unknown Artist - ___.mp3");
    }

    #[test]
    fn numbered_filename_pads_to_batch_size() {
        let t = TrackDescriptor::named("A", "B");
        assert_eq!(t.numbered_mp3_filename(0, 9), "01 - A - B.mp3");
        assert_eq!(t.numbered_mp3_filename(7, 120), "008 - A - B.mp3");
    }

    #[test]
    fn display_name_prefers_metadata_over_url() {
        let mut t = TrackDescriptor::named("A", "B");
        t.url = Some("https://example.com".into());
        assert_eq!(t.display_name(), "A - B");
        let u = TrackDescriptor::from_url("https://example.com/v");
        assert_eq!(u.display_name(), "https://example.com/v");
    }
}
