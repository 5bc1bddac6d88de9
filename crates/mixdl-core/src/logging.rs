//! Logging init: file under the XDG state dir, falling back to stderr.
//!
//! Batch runs print their own progress to stdout; tracing output goes to a
//! log file so the two never interleave on the terminal.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mixdl=debug,mixdl_core=debug";

/// Per-event writer: the cloned log file, or stderr if cloning fails.
enum LogTarget {
    File(std::fs::File),
    Stderr,
}

impl io::Write for LogTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogTarget::File(f) => f.write(buf),
            LogTarget::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogTarget::File(f) => f.flush(),
            LogTarget::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(std::fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = LogTarget;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogTarget::File)
            .unwrap_or(LogTarget::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging to `~/.local/state/mixdl/mixdl.log`.
/// Returns Err when the state dir is unwritable so the caller can fall back
/// to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mixdl")?;
    let log_dir = xdg_dirs.get_state_home().join("mixdl");
    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("mixdl.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;
    let writer = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::debug!("logging to {}", log_file_path.display());
    Ok(())
}

/// Stderr-only logging, used when the log file cannot be opened.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
