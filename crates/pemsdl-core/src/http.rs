//! Shared libcurl `Easy` setup for every portal request.
//!
//! All requests are blocking and made from the calling thread.

use std::str;
use std::time::Duration;

/// Transfer knobs shared by login, listing and file requests.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    /// libcurl receive buffer size; also the largest chunk handed to the writer.
    pub buffer_size: Option<usize>,
    pub connect_timeout: Duration,
    /// Abort a transfer slower than `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            buffer_size: None,
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

impl CurlOptions {
    /// A configured handle for `url`, carrying `cookie` (a `Cookie` header value) if given.
    pub fn easy(&self, url: &str, cookie: Option<&str>) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        if let Some(sz) = self.buffer_size {
            easy.buffer_size(sz)?;
        }
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        if let Some(c) = cookie.filter(|c| !c.is_empty()) {
            easy.cookie(c)?;
        }
        Ok(easy)
    }
}

/// True for 2xx.
pub fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Performs the request on `easy`, collecting header lines and the whole body.
///
/// Only for small responses (login page, listing JSON); file bodies are
/// streamed by the portal instead.
pub fn perform_collect(
    easy: &mut curl::easy::Easy,
) -> Result<(u32, Vec<String>, Vec<u8>), curl::Error> {
    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    let code = easy.response_code()?;
    Ok((code, headers, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(302));
        assert!(!is_success(404));
        assert!(!is_success(500));
    }

    #[test]
    fn easy_accepts_options() {
        let opts = CurlOptions {
            buffer_size: Some(8192),
            ..CurlOptions::default()
        };
        assert!(opts.easy("https://pems.example/", Some("PHPSESSID=abc")).is_ok());
    }
}
