mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Log to the state-dir file; fall back to stderr when it is unwritable.
    if mixdl_core::logging::init_logging().is_err() {
        mixdl_core::logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("mixdl error: {:#}", err);
        std::process::exit(1);
    }
}
