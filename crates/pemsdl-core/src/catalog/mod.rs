//! Remote file descriptors as listed by the clearinghouse.
//!
//! A listing entry is only trusted after `RemoteFile::from_raw` has checked
//! its name, date, size and URL. Any entry that fails is a `ValidationError`
//! that ends the run: an unexpected shape means the portal changed.

mod name;

pub use name::{check_file_name, file_date};

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

/// Size as sent by the portal: usually a display string like `"1,234,567"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Number(u64),
    Text(String),
}

/// One entry of a month list, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDescriptor {
    pub file_name: String,
    pub url: String,
    #[serde(alias = "byte_size", alias = "file_size")]
    pub bytes: RawSize,
    /// Month label the entry was listed under; filled in by the listing.
    #[serde(skip)]
    pub month: String,
}

/// A validated remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub file_name: String,
    pub url: Url,
    pub byte_size: u64,
    pub date: NaiveDate,
    pub month: String,
}

impl RemoteFile {
    /// Validate a raw entry and resolve its URL against the portal root.
    pub fn from_raw(raw: RawDescriptor, base: &Url) -> Result<Self, ValidationError> {
        check_file_name(&raw.file_name)?;
        let date = file_date(&raw.file_name)?;
        let byte_size = parse_size(&raw.file_name, &raw.bytes)?;
        let url = base.join(&raw.url).map_err(|source| ValidationError::Url {
            file_name: raw.file_name.clone(),
            url: raw.url.clone(),
            source,
        })?;
        Ok(RemoteFile {
            file_name: raw.file_name,
            url,
            byte_size,
            date,
            month: raw.month,
        })
    }
}

/// Parses `"1,234,567"` (thousands separators optional) into a byte count.
pub fn parse_size(file_name: &str, raw: &RawSize) -> Result<u64, ValidationError> {
    match raw {
        RawSize::Number(n) => Ok(*n),
        RawSize::Text(s) => {
            let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ValidationError::Size {
                    file_name: file_name.to_string(),
                    size: s.clone(),
                });
            }
            digits.parse::<u64>().map_err(|_| ValidationError::Size {
                file_name: file_name.to_string(),
                size: s.clone(),
            })
        }
    }
}

/// Inclusive upper bound on embedded file dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cutoff(Option<NaiveDate>);

impl Cutoff {
    pub fn new(last_included: Option<NaiveDate>) -> Self {
        Cutoff(last_included)
    }

    /// True unless the file is dated strictly after the cutoff.
    pub fn includes(&self, file: &RemoteFile) -> bool {
        match self.0 {
            Some(last) => file.date <= last,
            None => true,
        }
    }
}
