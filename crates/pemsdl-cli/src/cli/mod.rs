//! CLI for the pemsdl clearinghouse downloader.

mod run;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Download PeMS clearinghouse files missing from a folder, one at a time.
///
/// Credentials are read from PEMS_USER and PEMS_PASSWORD; districts, years and
/// the date cutoff come from the config file.
#[derive(Debug, Parser)]
#[command(name = "pemsdl")]
#[command(about = "Serially download PeMS clearinghouse files missing from a folder")]
pub struct Cli {
    /// Type of data to retrieve.
    #[arg(long = "type", value_name = "TYPE", default_value = "station_5min")]
    pub data_type: String,

    /// Output folder.
    #[arg(value_name = "DATA_FOLDER")]
    pub data_folder: PathBuf,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        run::run_download(&cli)
    }
}

#[cfg(test)]
mod tests;
