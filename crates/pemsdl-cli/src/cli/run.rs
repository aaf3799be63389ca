//! Wires credentials, config, login and the reconciler together.

use anyhow::Result;
use pemsdl_core::config;
use pemsdl_core::http::CurlOptions;
use pemsdl_core::portal::CurlPortal;
use pemsdl_core::reconcile::{Reconciler, RunSettings};
use pemsdl_core::session::{Credentials, Session};

use super::Cli;

pub fn run_download(cli: &Cli) -> Result<()> {
    // Checked before anything touches the network.
    let credentials = Credentials::from_env()?;

    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    let base_url = cfg.portal_url()?;

    let curl = CurlOptions {
        buffer_size: Some(cfg.chunk_size),
        ..CurlOptions::default()
    };
    let session = Session::login(&base_url, &credentials, &curl)?;

    let settings = RunSettings::from_config(&cfg, &cli.data_type);
    let portal = CurlPortal::new(session, curl);
    let mut reconciler = Reconciler::new(portal, settings, &cli.data_folder);
    reconciler.run()?;
    Ok(())
}
