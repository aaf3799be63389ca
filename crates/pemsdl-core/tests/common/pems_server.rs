//! Minimal HTTP/1.1 clearinghouse stand-in for integration tests.
//!
//! `POST /` logs in (sets a session cookie when the password matches),
//! `GET /?srq=clearinghouse&district_id=N...` returns the listing JSON, and
//! `GET /?download=ID` returns a file body. Listing and download requests
//! without the session cookie get 403.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

pub const SESSION_COOKIE: &str = "PHPSESSID=integration-session";

/// What the server offers. Files are served under `download=<district>-<index>`.
#[derive(Debug, Clone, Default)]
pub struct Clearinghouse {
    pub password: String,
    /// district -> (file name, body); districts absent here list as `[]`.
    pub files: HashMap<u32, Vec<(String, Vec<u8>)>>,
    /// download id -> number of leading 500 responses.
    pub fail_first: HashMap<String, u32>,
}

impl Clearinghouse {
    pub fn new(password: &str) -> Self {
        Clearinghouse {
            password: password.to_string(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, district: u32, name: &str, body: &[u8]) -> Self {
        self.files
            .entry(district)
            .or_default()
            .push((name.to_string(), body.to_vec()));
        self
    }

    pub fn failing(mut self, download_id: &str, times: u32) -> Self {
        self.fail_first.insert(download_id.to_string(), times);
        self
    }

    fn listing(&self, district: u32) -> String {
        let Some(files) = self.files.get(&district) else {
            return "[]".to_string();
        };
        let entries: Vec<String> = files
            .iter()
            .enumerate()
            .map(|(i, (name, body))| {
                format!(
                    r#"{{"file_name": "{}", "url": "/?download={}-{}", "bytes": "{}"}}"#,
                    name,
                    district,
                    i,
                    with_commas(body.len())
                )
            })
            .collect();
        format!(r#"{{"data": {{"August": [{}]}}}}"#, entries.join(","))
    }

    fn body(&self, download_id: &str) -> Option<&[u8]> {
        let (district, index) = download_id.split_once('-')?;
        let files = self.files.get(&district.parse().ok()?)?;
        files
            .get(index.parse::<usize>().ok()?)
            .map(|(_, b)| b.as_slice())
    }
}

fn with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Handle to a running server.
pub struct Running {
    pub base_url: String,
    /// Request targets in arrival order, e.g. `POST /` or `GET /?download=3-0`.
    pub hits: Arc<Mutex<Vec<String>>>,
}

impl Running {
    pub fn hits_matching(&self, needle: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.contains(needle))
            .count()
    }
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start(house: Clearinghouse) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let house = Arc::new(Mutex::new(house));
    let hits = Arc::new(Mutex::new(Vec::new()));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let house = Arc::clone(&house);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &house, &hits));
        }
    });
    Running {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

struct Request {
    method: String,
    target: String,
    cookie: Option<String>,
    body: String,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let target = first.next()?.to_string();
    let mut cookie = None;
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("cookie") {
                cookie = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some(Request {
        method,
        target,
        cookie,
        body,
    })
}

fn respond(stream: &mut TcpStream, status: &str, extra_headers: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra_headers
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(mut stream: TcpStream, house: &Mutex<Clearinghouse>, hits: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    hits.lock()
        .unwrap()
        .push(format!("{} {}", req.method, req.target));

    let query = req.target.split_once('?').map(|(_, q)| q).unwrap_or("");
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    if req.method == "POST" {
        let form: HashMap<String, String> = url::form_urlencoded::parse(req.body.as_bytes())
            .into_owned()
            .collect();
        let ok = form.get("password") == Some(&house.lock().unwrap().password)
            && form.get("login").map(String::as_str) == Some("Login");
        if ok {
            let set = format!("Set-Cookie: {}; path=/; HttpOnly\r\n", SESSION_COOKIE);
            respond(&mut stream, "200 OK", &set, b"<html>welcome</html>");
        } else {
            respond(&mut stream, "401 Unauthorized", "", b"bad credentials");
        }
        return;
    }

    let authed = req
        .cookie
        .as_deref()
        .is_some_and(|c| c.split(';').any(|p| p.trim() == SESSION_COOKIE));
    if !authed {
        respond(&mut stream, "403 Forbidden", "", b"login required");
        return;
    }

    if params.get("srq").map(String::as_str) == Some("clearinghouse") {
        let district = params
            .get("district_id")
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);
        let listing = house.lock().unwrap().listing(district);
        respond(
            &mut stream,
            "200 OK",
            "Content-Type: application/json\r\n",
            listing.as_bytes(),
        );
        return;
    }

    if let Some(id) = params.get("download") {
        let mut house = house.lock().unwrap();
        if let Some(left) = house.fail_first.get_mut(id) {
            if *left > 0 {
                *left -= 1;
                drop(house);
                respond(&mut stream, "500 Internal Server Error", "", b"try later");
                return;
            }
        }
        match house.body(id).map(|b| b.to_vec()) {
            Some(body) => {
                drop(house);
                respond(&mut stream, "200 OK", "", &body);
            }
            None => respond(&mut stream, "404 Not Found", "", b"no such file"),
        }
        return;
    }

    respond(&mut stream, "404 Not Found", "", b"");
}
