//! Serial downloader for the Caltrans PeMS data clearinghouse.
//!
//! Logs in, walks the configured districts and years, and fetches every
//! listed file missing from the output directory, one request at a time.

pub mod config;
pub mod error;
pub mod logging;

pub mod catalog;
pub mod http;
pub mod portal;
pub mod reconcile;
pub mod retry;
pub mod session;
pub mod storage;
