//! Well-known content types.

use std::fmt;

/// A MIME type commonly sent in `Content-Type` / `Accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ApplicationAtomXml,
    ApplicationFormUrlencoded,
    ApplicationJson,
    ApplicationJsonPatch,
    ApplicationOctetStream,
    ApplicationXhtmlXml,
    ApplicationXml,
    ImageGif,
    ImageJpeg,
    ImagePng,
    ImageSvg,
    ImageWebp,
    MultipartFormData,
    TextHtml,
    TextPlain,
    TextXml,
    Wildcard,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ApplicationAtomXml => "application/atom+xml",
            ContentType::ApplicationFormUrlencoded => "application/x-www-form-urlencoded",
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationJsonPatch => "application/json-patch+json",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::ApplicationXhtmlXml => "application/xhtml+xml",
            ContentType::ApplicationXml => "application/xml",
            ContentType::ImageGif => "image/gif",
            ContentType::ImageJpeg => "image/jpeg",
            ContentType::ImagePng => "image/png",
            ContentType::ImageSvg => "image/svg+xml",
            ContentType::ImageWebp => "image/webp",
            ContentType::MultipartFormData => "multipart/form-data",
            ContentType::TextHtml => "text/html",
            ContentType::TextPlain => "text/plain",
            ContentType::TextXml => "text/xml",
            ContentType::Wildcard => "*/*",
        }
    }

    /// The MIME type with a `charset` parameter appended.
    pub fn with_charset(&self, charset: &str) -> String {
        format!("{}; charset={}", self.as_str(), charset)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the `charset` parameter of a `Content-Type` value.
pub fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_of() {
        assert_eq!(
            charset_of("text/html; charset=ISO-8859-1").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_of("application/json;Charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_of("application/json"), None);
    }

    #[test]
    fn test_with_charset() {
        assert_eq!(
            ContentType::TextPlain.with_charset("UTF-8"),
            "text/plain; charset=UTF-8"
        );
    }
}
