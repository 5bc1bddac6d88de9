pub mod config;
pub mod logging;

pub mod control;
pub mod download;
pub mod scheduler;
pub mod search;
pub mod track;
pub mod ytdlp;
