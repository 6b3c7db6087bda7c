//! Ordered, case-insensitive header multimap.
//!
//! Unlike `http::HeaderMap`, names keep the exact case they were added
//! with and several entries may share a name (`Set-Cookie`, `Link`, ...).
//! Lookups scan linearly; requests and responses rarely carry more than a
//! couple dozen entries.

use std::fmt;


/// A header name-value pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    /// Create a new header.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Header name, in the case it was added with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header value.
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    fn name_eq(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Header multimap preserving insertion order.
///
/// # Example
///
/// ```rust
/// use courier_http::Headers;
///
/// let mut headers = Headers::new();
/// headers.add("Accept", "text/html");
/// headers.add("accept", "application/json");
///
/// assert_eq!(headers.get("ACCEPT"), vec!["text/html", "application/json"]);
/// assert_eq!(headers.size(), 1);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    /// Create an empty header map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. Empty names are ignored.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.entries.push(Header {
            name,
            value: value.into(),
        });
    }

    /// Remove every entry with this name, then add a single entry.
    pub fn replace(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.add(name, value);
    }

    /// All values for a name, in insertion order.
    pub fn get(&self, name: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|h| h.name_eq(name))
            .map(|h| h.value.clone())
            .collect()
    }

    /// First value for a name, or an empty string.
    pub fn get_first(&self, name: &str) -> String {
        self.entries
            .iter()
            .find(|h| h.name_eq(name))
            .map(|h| h.value.clone())
            .unwrap_or_default()
    }

    /// Check if any entry has this name.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|h| h.name_eq(name))
    }

    /// Remove all entries with this name. Returns the number removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|h| !h.name_eq(name));
        before - self.entries.len()
    }

    /// Remove only the entries matching both name and value.
    pub fn remove_value(&mut self, name: &str, value: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|h| !(h.name_eq(name) && h.value.eq_ignore_ascii_case(value)));
        before - self.entries.len()
    }

    /// Number of distinct (case-insensitive) header names.
    pub fn size(&self) -> usize {
        let mut seen: Vec<String> = Vec::with_capacity(self.entries.len());
        for h in &self.entries {
            let lower = h.name.to_ascii_lowercase();
            if !seen.contains(&lower) {
                seen.push(lower);
            }
        }
        seen.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of every entry, in order.
    pub fn all(&self) -> Vec<Header> {
        self.entries.clone()
    }

    /// Append every entry of `other`.
    pub fn put_all(&mut self, other: &Headers) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
    }

    /// Check every entry against the HTTP field grammar.
    ///
    /// Returns a message naming the first entry that could not be sent.
    pub fn validate(&self) -> Result<(), String> {
        self.entries
            .iter()
            .try_for_each(|h| check_header(&h.name, &h.value))
    }
}

/// Check a single header name and value against the HTTP field grammar.
pub(crate) fn check_header(name: &str, value: &str) -> Result<(), String> {
    http::HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| format!("invalid header name: {name:?}"))?;
    http::HeaderValue::from_str(value)
        .map_err(|_| format!("invalid value for header {name}: {value:?}"))?;
    Ok(())
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

/// Renders one `Name: value` line per entry.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, h) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{h}")?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.add(k, v);
        }
        headers
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}

impl From<&http::HeaderMap> for Headers {
    fn from(map: &http::HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "application/json");

        assert_eq!(headers.get("content-type"), headers.get("CONTENT-TYPE"));
        assert_eq!(headers.get("content-type"), vec!["application/json"]);
    }

    #[test]
    fn test_size_counts_distinct_names() {
        let mut headers = Headers::new();
        headers.add("Set-Cookie", "a=1");
        headers.add("set-cookie", "b=2");
        headers.add("SET-COOKIE", "c=3");
        headers.add("Accept", "*/*");

        assert_eq!(headers.size(), 2);
        assert_eq!(headers.all().len(), 4);
    }

    #[test]
    fn test_get_preserves_insertion_order() {
        let mut headers = Headers::new();
        headers.add("Link", "first");
        headers.add("X-Other", "x");
        headers.add("link", "second");

        assert_eq!(headers.get("LINK"), vec!["first", "second"]);
        assert_eq!(headers.get_first("link"), "first");
    }

    #[test]
    fn test_get_first_missing_is_empty() {
        let headers = Headers::new();
        assert_eq!(headers.get_first("Nope"), "");
        assert!(headers.get("Nope").is_empty());
    }

    #[test]
    fn test_empty_name_is_ignored() {
        let mut headers = Headers::new();
        headers.add("", "value");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_replace_removes_all_matches() {
        let mut headers = Headers::new();
        headers.add("Accept", "text/html");
        headers.add("accept", "text/plain");
        headers.replace("ACCEPT", "application/json");

        assert_eq!(headers.get("Accept"), vec!["application/json"]);
        assert_eq!(headers.all()[0].name(), "ACCEPT");
    }

    #[test]
    fn test_remove_value_only_removes_exact_pairs() {
        let mut headers = Headers::new();
        headers.add("Vary", "Accept");
        headers.add("Vary", "Origin");

        assert_eq!(headers.remove_value("vary", "Origin"), 1);
        assert_eq!(headers.get("Vary"), vec!["Accept"]);
        assert_eq!(headers.remove_value("vary", "Missing"), 0);
    }

    #[test]
    fn test_all_is_a_copy() {
        let mut headers = Headers::new();
        headers.add("A", "1");
        let mut copy = headers.all();
        copy.clear();
        assert_eq!(headers.all().len(), 1);
    }

    #[test]
    fn test_put_all_appends() {
        let mut a = Headers::new();
        a.add("A", "1");
        let mut b = Headers::new();
        b.add("a", "2");
        b.add("B", "3");

        a.put_all(&b);
        assert_eq!(a.get("A"), vec!["1", "2"]);
        assert_eq!(a.size(), 2);
    }

    #[test]
    fn test_display_lists_lines() {
        let headers: Headers = [("Content-Length", "42"), ("Cache-Control", "no-cache")]
            .into_iter()
            .collect();
        assert_eq!(
            headers.to_string(),
            "Content-Length: 42\nCache-Control: no-cache"
        );
    }

    #[test]
    fn test_validate_rejects_line_breaks_and_bad_names() {
        let mut headers = Headers::new();
        headers.add("X-Ok", "plain value");
        assert!(headers.validate().is_ok());

        headers.add("X-Bad", "a\nb");
        assert!(headers.validate().unwrap_err().contains("X-Bad"));

        assert!(check_header("Bad Name", "v").is_err());
        assert!(check_header("X-Tab", "a\tb").is_ok());
    }
}
