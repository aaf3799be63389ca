//! Clearinghouse file names: shape check and embedded date.

use crate::error::ValidationError;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^d[a-z0-9_]+\.txt(\.gz)?$").expect("file name pattern"))
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"_(\d{4})_(\d{2})_(\d{2})\.txt(?:\.gz)?$").expect("file date pattern")
    })
}

/// Checks that `name` is a whole-string match for `d[a-z0-9_]+.txt[.gz]`.
///
/// The pattern also keeps names free of path separators, so a checked name
/// can be joined onto the output directory as is.
pub fn check_file_name(name: &str) -> Result<(), ValidationError> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::FileName(name.to_string()))
    }
}

/// Extracts the trailing `YYYY_MM_DD` date, e.g. `d03_text_station_5min_2022_08_18.txt.gz`.
pub fn file_date(name: &str) -> Result<NaiveDate, ValidationError> {
    let caps = date_pattern()
        .captures(name)
        .ok_or_else(|| ValidationError::MissingDate(name.to_string()))?;
    let num = |i: usize| caps[i].parse::<u32>();
    let (Ok(y), Ok(m), Ok(d)) = (num(1), num(2), num(3)) else {
        return Err(ValidationError::InvalidDate(name.to_string()));
    };
    NaiveDate::from_ymd_opt(y as i32, m, d)
        .ok_or_else(|| ValidationError::InvalidDate(name.to_string()))
}
