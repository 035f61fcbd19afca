use std::process::ExitCode;

use clap::Parser;

use chatstream::cli::{self, Cli};
use chatstream::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose);

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {e:?}");
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}
