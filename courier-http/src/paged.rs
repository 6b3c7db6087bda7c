//! Link-following pagination.
//!
//! [`PagedIterator`] executes a request, asks the caller for the next page's
//! URL and repeats with a copy of the request pointed at that URL. It does
//! not detect cycles: an API that keeps returning the same link is followed
//! forever unless [`PagedIterator::max_pages`] is set.

use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::error::{HttpClientError, Result};
use crate::header_names::LINK;
use crate::headers::Headers;
use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Lazy sequence of pages.
///
/// Yields one item per executed request. A pipeline error is yielded once
/// and ends the sequence.
pub struct PagedIterator<T, M, L> {
    next: Option<HttpRequest>,
    mapping: M,
    link: L,
    max_pages: Option<usize>,
    pages: usize,
    _body: PhantomData<fn() -> T>,
}

impl<T, M, L> PagedIterator<T, M, L>
where
    M: FnMut(HttpRequest) -> Result<HttpResponse<T>>,
    L: FnMut(&HttpResponse<T>) -> Option<String>,
{
    pub fn new(request: HttpRequest, mapping: M, link: L) -> Self {
        Self {
            next: Some(request),
            mapping,
            link,
            max_pages: None,
            pages: 0,
            _body: PhantomData,
        }
    }

    /// Stop after `max` pages even if another link was returned.
    pub fn max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    /// Execute every remaining page.
    pub fn collect_list(self) -> PagedList<T> {
        self.collect()
    }
}

impl<T, M, L> Iterator for PagedIterator<T, M, L>
where
    M: FnMut(HttpRequest) -> Result<HttpResponse<T>>,
    L: FnMut(&HttpResponse<T>) -> Option<String>,
{
    type Item = Result<HttpResponse<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let request = self.next.take()?;

        if let Some(max) = self.max_pages
            && self.pages >= max
        {
            warn!(max_pages = max, next = %request.url(), "Page limit reached, stopping pagination");
            return None;
        }
        self.pages += 1;

        let response = match (self.mapping)(request.clone()) {
            Ok(response) => response,
            Err(e) => {
                debug!(page = self.pages, error = %e, "Pagination stopped by error");
                return Some(Err(e));
            }
        };

        match (self.link)(&response).filter(|link| !link.trim().is_empty()) {
            Some(link) => {
                debug!(page = self.pages, next = %link, "Following next page");
                self.next = Some(request.follow(&link));
            }
            None => debug!(pages = self.pages, "Pagination finished"),
        }

        Some(Ok(response))
    }
}

/// Every page of a paged sequence, plus the error that ended it, if any.
#[derive(Debug)]
pub struct PagedList<T> {
    pages: Vec<HttpResponse<T>>,
    error: Option<HttpClientError>,
}

impl<T> PagedList<T> {
    pub fn pages(&self) -> &[HttpResponse<T>] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<HttpResponse<T>> {
        self.pages
    }

    /// The error that ended the sequence early.
    pub fn error(&self) -> Option<&HttpClientError> {
        self.error.as_ref()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Run `consumer` for every successful page.
    pub fn if_success(self, mut consumer: impl FnMut(&HttpResponse<T>)) -> Self {
        self.pages
            .iter()
            .filter(|page| page.is_success())
            .for_each(&mut consumer);
        self
    }

    /// Run `consumer` for every failed page.
    pub fn if_failure(self, mut consumer: impl FnMut(&HttpResponse<T>)) -> Self {
        self.pages
            .iter()
            .filter(|page| !page.is_success())
            .for_each(&mut consumer);
        self
    }

    /// Bodies of all pages that have one.
    pub fn bodies(&self) -> Vec<&T> {
        self.pages.iter().filter_map(HttpResponse::body).collect()
    }
}

impl<T> FromIterator<Result<HttpResponse<T>>> for PagedList<T> {
    fn from_iter<I: IntoIterator<Item = Result<HttpResponse<T>>>>(iter: I) -> Self {
        let mut list = PagedList {
            pages: Vec::new(),
            error: None,
        };
        for page in iter {
            match page {
                Ok(page) => list.pages.push(page),
                Err(e) => {
                    list.error = Some(e);
                    break;
                }
            }
        }
        list
    }
}

impl<T> IntoIterator for PagedList<T> {
    type Item = HttpResponse<T>;
    type IntoIter = std::vec::IntoIter<HttpResponse<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

/// The `rel="next"` target of an RFC 8288 `Link` header.
pub fn next_link_from_header(headers: &Headers) -> Option<String> {
    for value in headers.get(LINK) {
        let mut rest = value.as_str();

        while let Some(start) = rest.find('<') {
            let Some(len) = rest[start..].find('>') else {
                break;
            };
            let target = &rest[start + 1..start + len];
            let after = &rest[start + len + 1..];
            let params_end = after.find('<').unwrap_or(after.len());

            if after[..params_end].split(';').any(is_next_rel) {
                return Some(target.trim().to_string());
            }
            rest = &after[params_end..];
        }
    }
    None
}

fn is_next_rel(param: &str) -> bool {
    let Some((name, value)) = param.split_once('=') else {
        return false;
    };
    name.trim().eq_ignore_ascii_case("rel")
        && value
            .trim()
            .trim_end_matches(',')
            .trim()
            .trim_matches('"')
            .split_ascii_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}
