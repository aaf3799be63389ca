use pemsdl_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible; a missing log dir only loses the file copy.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = Cli::run_from_args() {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}
