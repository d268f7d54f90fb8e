//! URL handling module for Quarry
//!
//! This module provides host extraction, allowed-domain filtering and
//! resolution of extracted links against the page they were found on.

mod domain;

pub use domain::{domain_matches, extract_domain, DomainFilter};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute http(s) URL
pub fn parse_http_url(s: &str) -> UrlResult<Url> {
    let url = Url::parse(s.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Resolves an extracted href against the page URL
///
/// Returns None if the link cannot be followed:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - anything that does not resolve to an http(s) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut resolved = base_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}
