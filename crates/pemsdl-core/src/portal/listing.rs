//! Clearinghouse listing body: `[]` when there is nothing, otherwise
//! `{"data": {"<month>": [<descriptor>, ...], ...}}`.

use crate::catalog::RawDescriptor;
use crate::error::ListingError;
use serde_json::Value;

/// Files listed for one district and year, grouped by month in listing order.
#[derive(Debug, Clone)]
pub struct Listing {
    district: u32,
    year: i32,
    months: Vec<(String, Vec<RawDescriptor>)>,
}

impl Listing {
    pub fn empty(district: u32, year: i32) -> Self {
        Listing {
            district,
            year,
            months: Vec::new(),
        }
    }

    pub fn parse(district: u32, year: i32, body: &[u8]) -> Result<Self, ListingError> {
        let malformed = |reason: String| ListingError::Malformed {
            district,
            year,
            reason,
        };

        let value: Value = serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
        let data = match value {
            Value::Array(items) if items.is_empty() => return Ok(Self::empty(district, year)),
            Value::Object(mut obj) => obj
                .remove("data")
                .ok_or_else(|| malformed("no `data` member".to_string()))?,
            _ => return Err(malformed("expected an object or an empty list".to_string())),
        };

        let months = match data {
            Value::Array(items) if items.is_empty() => Vec::new(),
            Value::Object(months) => {
                let mut out = Vec::with_capacity(months.len());
                for (month, files) in months {
                    let mut files: Vec<RawDescriptor> = serde_json::from_value(files)
                        .map_err(|e| malformed(format!("month {}: {}", month, e)))?;
                    for f in &mut files {
                        f.month = month.clone();
                    }
                    out.push((month, files));
                }
                out
            }
            _ => return Err(malformed("`data` is not a month map".to_string())),
        };

        Ok(Listing {
            district,
            year,
            months,
        })
    }

    pub fn district(&self) -> u32 {
        self.district
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Total number of listed files across all months.
    pub fn len(&self) -> usize {
        self.months.iter().map(|(_, f)| f.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the listing, yielding every descriptor month by month.
    pub fn into_files(self) -> impl Iterator<Item = RawDescriptor> {
        self.months.into_iter().flat_map(|(month, files)| {
            tracing::info!("{} ({} files)", month, files.len());
            files
        })
    }
}
