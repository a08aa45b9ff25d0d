//! Visitor identity carried in the `uid` cookie.
//!
//! There is no authentication behind this: any well-formed numeric id is
//! accepted and stored verbatim. The rest of the app only cares whether an id
//! is present.

use std::fmt;

use axum::http::{HeaderMap, header};

pub const COOKIE_NAME: &str = "uid";
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;
const MAX_ID_DIGITS: usize = 12;

/// A numeric visitor id of one to twelve ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for anything that is not 1..=12 digits after trimming.
    /// Callers cannot tell "invalid" from "absent", which is intentional.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_ID_DIGITS
            && trimmed.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the id out of every `Cookie` header on the request.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .and_then(|(_, value)| Self::parse(value))
    }

    /// `Set-Cookie` value that stores this id for thirty days.
    pub fn set_cookie(&self, secure: bool) -> String {
        let mut cookie = format!(
            "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}",
            self.0
        );
        if secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `Set-Cookie` value that expires the id immediately.
pub fn clear_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
