//! Error taxonomy for a download run.
//!
//! Everything except `FetchError` is fatal: the CLI logs it and exits 1.
//! `FetchError` is what a single transfer attempt can fail with; the retry
//! loop decides whether it escalates to `RunError::RetryExhausted`.

use std::path::PathBuf;
use thiserror::Error;

/// Login could not produce a usable session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} not found in environment")]
    MissingCredentials(&'static str),
    #[error("login rejected with HTTP {status}")]
    Rejected { status: u32 },
    #[error("login request failed: {0}")]
    Transport(#[from] curl::Error),
}

/// The file listing for a district/year could not be retrieved or understood.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing for district {district}, {year} returned HTTP {status}")]
    Http { district: u32, year: i32, status: u32 },
    #[error("listing for district {district}, {year} failed: {source}")]
    Transport {
        district: u32,
        year: i32,
        #[source]
        source: curl::Error,
    },
    #[error("listing for district {district}, {year} is malformed: {reason}")]
    Malformed {
        district: u32,
        year: i32,
        reason: String,
    },
}

/// A listed descriptor does not have the shape the portal has always used.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("file name {0:?} does not match the expected pattern")]
    FileName(String),
    #[error("file name {0:?} carries no YYYY_MM_DD date")]
    MissingDate(String),
    #[error("file name {0:?} carries an impossible date")]
    InvalidDate(String),
    #[error("size {size:?} of {file_name} is not a byte count")]
    Size { file_name: String, size: String },
    #[error("url {url:?} of {file_name} cannot be resolved: {source}")]
    Url {
        file_name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// One transfer attempt failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

/// Anything that ends a run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not retrieve {file_name} after {attempts} tries: {last}")]
    RetryExhausted {
        file_name: String,
        attempts: u32,
        #[source]
        last: FetchError,
    },
    #[error("failed to move {} into place: {source}", .temp.display())]
    Finalize {
        temp: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
