//! Runtime control plumbing: the socket path and the one-line wire format
//! used to retune a running batch's concurrency.
//!
//! `mixdl download` listens on a Unix socket; `mixdl limit 2` connects and
//! sends a single line. The parsed command is applied straight to the
//! batch's `CapacityHandle`, so the change takes effect on the scheduler's
//! next admission decision.

use std::fmt;
use std::path::PathBuf;

/// A parsed control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Set the live concurrency limit.
    Limit(usize),
}

impl ControlCommand {
    /// Parse one protocol line; returns None for anything malformed so the
    /// listener can skip bad input without dropping the connection.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix("limit ")?;
        rest.trim().parse::<usize>().ok().map(ControlCommand::Limit)
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Limit(n) => write!(f, "limit {n}"),
        }
    }
}

/// Default path for the control socket (XDG state dir, like the log file).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("mixdl")?.get_state_home();
    Ok(dir.join("control.sock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_limit_lines() {
        assert_eq!(ControlCommand::parse("limit 3"), Some(ControlCommand::Limit(3)));
        assert_eq!(ControlCommand::parse("  limit 10 \n"), Some(ControlCommand::Limit(10)));
        assert_eq!(ControlCommand::parse("limit 0"), Some(ControlCommand::Limit(0)));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(ControlCommand::parse("limit"), None);
        assert_eq!(ControlCommand::parse("limit x"), None);
        assert_eq!(ControlCommand::parse("limit -1"), None);
        assert_eq!(ControlCommand::parse("pause 1"), None);
        assert_eq!(ControlCommand::parse(""), None);
    }

    #[test]
    fn display_is_the_wire_format() {
        assert_eq!(ControlCommand::Limit(4).to_string(), "limit 4");
        let round = ControlCommand::parse(&ControlCommand::Limit(4).to_string());
        assert_eq!(round, Some(ControlCommand::Limit(4)));
    }
}
