//! CLI command handlers. Each command is in its own file.

mod check;
mod download;
mod limit;
mod search;

pub use check::run_check;
pub use download::run_download;
pub use limit::run_limit;
pub use search::run_search;
