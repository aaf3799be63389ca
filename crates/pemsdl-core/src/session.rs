//! Portal login and the cookie-based session it yields.

use crate::error::AuthError;
use crate::http::{self, CurlOptions};
use std::fmt;
use url::Url;

pub const USER_VAR: &str = "PEMS_USER";
pub const PASSWORD_VAR: &str = "PEMS_PASSWORD";

/// Portal username and password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads `PEMS_USER` and `PEMS_PASSWORD`.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USER_VAR).ok_or(AuthError::MissingCredentials(USER_VAR))?;
        let password = lookup(PASSWORD_VAR).ok_or(AuthError::MissingCredentials(PASSWORD_VAR))?;
        Ok(Credentials::new(username, password))
    }

    fn login_form(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .append_pair("redirect", "")
            .append_pair("login", "Login")
            .finish()
    }
}

/// Authenticated session: the portal root plus the cookies set at login.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    cookies: Vec<(String, String)>,
}

impl Session {
    pub fn new(base_url: Url, cookies: Vec<(String, String)>) -> Self {
        Session { base_url, cookies }
    }

    /// POSTs the login form to the portal root and keeps every cookie set along the way.
    pub fn login(
        base_url: &Url,
        credentials: &Credentials,
        curl: &CurlOptions,
    ) -> Result<Self, AuthError> {
        tracing::info!("logging in to {} as user {}", base_url, credentials.username);
        let form = credentials.login_form();
        let mut easy = curl.easy(base_url.as_str(), None)?;
        easy.post(true)?;
        easy.post_fields_copy(form.as_bytes())?;

        let (code, headers, body) = http::perform_collect(&mut easy)?;
        if !http::is_success(code) {
            tracing::error!(
                "login gave HTTP {}:\n{}",
                code,
                String::from_utf8_lossy(&body)
            );
            return Err(AuthError::Rejected { status: code });
        }

        let mut session = Session::new(base_url.clone(), Vec::new());
        for (name, value) in headers.iter().filter_map(|l| parse_set_cookie(l)) {
            session.set_cookie(name, value);
        }
        if session.cookies.is_empty() {
            tracing::warn!("login succeeded but the portal set no session cookie");
        } else {
            tracing::info!("login successful");
        }
        Ok(session)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Value for a `Cookie` request header, e.g. `PHPSESSID=abc; remember=1`.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&mut self, name: String, value: String) {
        match self.cookies.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.cookies.push((name, value)),
        }
    }
}

/// Name and value of a `Set-Cookie` header line; attributes are dropped.
fn parse_set_cookie(line: &str) -> Option<(String, String)> {
    let (header, value) = line.split_once(':')?;
    if !header.trim().eq_ignore_ascii_case("set-cookie") {
        return None;
    }
    let pair = value.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
