//! Cookie model, `Set-Cookie` parsing and `Cookie` header serialization.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::header_names::SET_COOKIE;
use crate::headers::Headers;

/// Cookie SameSite attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    None,
    Strict,
    Lax,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::None => "None",
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

impl FromStr for SameSite {
    type Err = CookieParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SameSite::None),
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            other => Err(CookieParseError::InvalidAttribute(format!(
                "SameSite={other}"
            ))),
        }
    }
}

/// A `Set-Cookie` value that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CookieParseError {
    #[error("Cookie has no name=value pair: {0:?}")]
    MissingPair(String),

    #[error("Cookie name is empty: {0:?}")]
    EmptyName(String),

    #[error("Invalid cookie attribute: {0}")]
    InvalidAttribute(String),
}

/// An HTTP cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: Option<String>,
    http_only: bool,
    secure: bool,
    max_age: Option<i64>,
    expires: Option<DateTime<Utc>>,
    same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a cookie with only a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            http_only: false,
            secure: false,
            max_age: None,
            expires: None,
            same_site: None,
        }
    }

    /// Parse a single `Set-Cookie` header value.
    pub fn parse(set_cookie: &str) -> Result<Self, CookieParseError> {
        set_cookie.parse()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Render the cookie with all of its attributes, as a server would
    /// send it in `Set-Cookie`.
    pub fn to_set_cookie_string(&self) -> String {
        let mut cookie = format!("{}={}", self.name, self.value);

        if let Some(ref domain) = self.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        if let Some(ref path) = self.path {
            cookie.push_str(&format!("; Path={path}"));
        }
        if let Some(max_age) = self.max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if let Some(expires) = self.expires {
            cookie.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            cookie.push_str(&format!("; SameSite={}", same_site.as_str()));
        }
        cookie
    }
}

/// Renders `name=value`, the form used in a request `Cookie` header.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl FromStr for Cookie {
    type Err = CookieParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let pair = parts.next().unwrap_or_default().trim();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| CookieParseError::MissingPair(s.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CookieParseError::EmptyName(s.to_string()));
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        let mut cookie = Cookie::new(name, value);

        for attribute in parts {
            let attribute = attribute.trim();
            if attribute.is_empty() {
                continue;
            }
            let (key, val) = match attribute.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attribute, ""),
            };

            match key.to_ascii_lowercase().as_str() {
                "domain" => cookie.domain = Some(val.to_string()),
                "path" => cookie.path = Some(val.to_string()),
                "httponly" => cookie.http_only = true,
                "secure" => cookie.secure = true,
                "max-age" => {
                    cookie.max_age = Some(val.parse().map_err(|_| {
                        CookieParseError::InvalidAttribute(format!("Max-Age={val}"))
                    })?)
                }
                "expires" => {
                    cookie.expires = Some(parse_expires(val).ok_or_else(|| {
                        CookieParseError::InvalidAttribute(format!("Expires={val}"))
                    })?)
                }
                // Unknown attributes and SameSite values are ignored, as user
                // agents do.
                "samesite" => cookie.same_site = val.parse().ok(),
                _ => {}
            }
        }

        Ok(cookie)
    }
}

fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    ["%a, %d-%b-%Y %H:%M:%S GMT", "%a, %d-%b-%y %H:%M:%S GMT"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// An ordered collection of cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    cookies: Vec<Cookie>,
}

impl Cookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `Set-Cookie` entry independently. Malformed entries are
    /// skipped.
    pub fn from_set_cookie_headers(headers: &Headers) -> Self {
        let mut cookies = Cookies::new();
        for value in headers.get(SET_COOKIE) {
            match value.parse::<Cookie>() {
                Ok(cookie) => cookies.add(cookie),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed Set-Cookie header");
                }
            }
        }
        cookies
    }

    pub fn add(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    /// The first cookie with this exact name.
    pub fn get_named(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a single request `Cookie` header, or `None` when empty.
    pub fn to_header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(Cookie::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl FromIterator<Cookie> for Cookies {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        Self {
            cookies: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Cookies {
    type Item = Cookie;
    type IntoIter = std::vec::IntoIter<Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_full_set_cookie() {
        let cookie = Cookie::parse(
            "session=abc123; Domain=example.com; Path=/; Max-Age=3600; \
             Expires=Wed, 21 Oct 2015 07:28:00 GMT; Secure; HttpOnly; SameSite=Lax",
        )
        .unwrap();

        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(3600));
        assert_eq!(cookie.expires().map(|e| e.year()), Some(2015));
        assert!(cookie.is_secure());
        assert!(cookie.is_http_only());
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_parse_netscape_expires() {
        let cookie = Cookie::parse("id=1; expires=Wed, 21-Oct-2015 07:28:00 GMT").unwrap();
        assert_eq!(cookie.expires().map(|e| e.day()), Some(21));
    }

    #[test]
    fn test_parse_quoted_value() {
        let cookie = Cookie::parse("theme=\"dark\"").unwrap();
        assert_eq!(cookie.value(), "dark");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Cookie::parse("no-equals-sign"),
            Err(CookieParseError::MissingPair(_))
        ));
        assert!(matches!(
            Cookie::parse("=value"),
            Err(CookieParseError::EmptyName(_))
        ));
        assert!(Cookie::parse("a=b; Max-Age=soon").is_err());
    }

    #[test]
    fn test_from_headers_skips_malformed() {
        let mut headers = Headers::new();
        headers.add("Set-Cookie", "garbage");
        headers.add("set-cookie", "user=42; Path=/");

        let cookies = Cookies::from_set_cookie_headers(&headers);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get_named("user").map(Cookie::value), Some("42"));
    }

    #[test]
    fn test_header_value_joins_pairs() {
        let cookies: Cookies = [Cookie::new("a", "1"), Cookie::new("b", "2")]
            .into_iter()
            .collect();
        assert_eq!(cookies.to_header_value().as_deref(), Some("a=1; b=2"));
        assert_eq!(Cookies::new().to_header_value(), None);
    }

    #[test]
    fn test_set_cookie_string_round_trips_attributes() {
        let cookie = Cookie::new("csrf", "t0k3n")
            .with_path("/")
            .with_secure(true)
            .with_http_only(true)
            .with_same_site(SameSite::Strict);

        let rendered = cookie.to_set_cookie_string();
        assert_eq!(rendered, "csrf=t0k3n; Path=/; Secure; HttpOnly; SameSite=Strict");
        assert_eq!(Cookie::parse(&rendered).unwrap(), cookie);
    }

    #[test]
    fn test_unknown_same_site_value_is_ignored() {
        let cookie: Cookie = "id=7; Path=/; SameSite=Sometimes".parse().unwrap();
        assert_eq!(cookie.value(), "7");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), None);
    }
}
