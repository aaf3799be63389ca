//! Authenticated access to the clearinghouse: listings and file bodies.
//!
//! Every operation takes `&mut self`, and the reconciler owns exactly one
//! portal, so at most one request is ever in flight. The provider blocks
//! concurrent downloads; keep it that way.

mod listing;

pub use listing::Listing;

use crate::error::{FetchError, ListingError};
use crate::http::{self, CurlOptions};
use crate::session::Session;
use std::cell::Cell;
use std::io::{self, Write};
use url::Url;

/// Where listings and file bodies come from.
pub trait Portal {
    /// Root that relative file URLs resolve against.
    fn base_url(&self) -> &Url;

    /// Files the clearinghouse offers for `district` and `year`.
    fn list_files(
        &mut self,
        district: u32,
        year: i32,
        data_type: &str,
    ) -> Result<Listing, ListingError>;

    /// Streams the body at `url` into `sink`, returning the number of bytes written.
    fn fetch(&mut self, url: &Url, sink: &mut dyn Write) -> Result<u64, FetchError>;
}

/// The real portal, over libcurl with the login session's cookies.
pub struct CurlPortal {
    session: Session,
    curl: CurlOptions,
}

impl CurlPortal {
    pub fn new(session: Session, curl: CurlOptions) -> Self {
        CurlPortal { session, curl }
    }
}

/// Query URL for the clearinghouse listing of one district/year/type.
pub fn listing_url(base: &Url, district: u32, year: i32, data_type: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("srq", "clearinghouse")
        .append_pair("district_id", &district.to_string())
        .append_pair("geotag", "")
        .append_pair("yy", &year.to_string())
        .append_pair("type", data_type)
        .append_pair("returnformat", "text");
    url
}

/// Status code from an HTTP status line (`HTTP/1.1 404 Not Found`).
fn status_line_code(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

impl Portal for CurlPortal {
    fn base_url(&self) -> &Url {
        self.session.base_url()
    }

    fn list_files(
        &mut self,
        district: u32,
        year: i32,
        data_type: &str,
    ) -> Result<Listing, ListingError> {
        let url = listing_url(self.session.base_url(), district, year, data_type);
        tracing::debug!(%url, "requesting listing");
        let cookie = self.session.cookie_header();
        let transport = |source| ListingError::Transport {
            district,
            year,
            source,
        };

        let mut easy = self.curl.easy(url.as_str(), Some(cookie.as_str())).map_err(transport)?;
        let (code, _headers, body) = http::perform_collect(&mut easy).map_err(transport)?;
        if !http::is_success(code) {
            return Err(ListingError::Http {
                district,
                year,
                status: code,
            });
        }
        Listing::parse(district, year, &body)
    }

    fn fetch(&mut self, url: &Url, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let cookie = self.session.cookie_header();
        let mut easy = self.curl.easy(url.as_str(), Some(cookie.as_str()))?;

        // Status of the latest response in the redirect chain; the body of a
        // non-2xx response is never written to the sink.
        let status = Cell::new(0u32);
        let mut written = 0u64;
        let mut sink_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(code) = std::str::from_utf8(data).ok().and_then(status_line_code) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                if !http::is_success(status.get()) {
                    return Ok(0); // abort transfer
                }
                match sink.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        sink_err = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = sink_err {
            return Err(FetchError::Storage(e));
        }
        let code = easy.response_code().unwrap_or_else(|_| status.get());
        if code != 0 && !http::is_success(code) {
            return Err(FetchError::Http(code));
        }
        performed?;
        sink.flush()?;
        Ok(written)
    }
}
