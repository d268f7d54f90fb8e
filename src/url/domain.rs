use url::Url;

/// Returns the lowercase host of a URL, if it has one
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks a host against an allowed-domain entry
///
/// `example.com` and `*.example.com` both match the domain itself and any
/// subdomain at any depth, but never a host that merely ends with the same
/// characters (`myexample.com`).
pub fn domain_matches(pattern: &str, host: &str) -> bool {
    let base = pattern.strip_prefix("*.").unwrap_or(pattern);
    match host.strip_suffix(base) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// The `allowedDomains` gate applied to every followed link
///
/// An empty filter allows everything.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    patterns: Vec<String>,
}

impl DomainFilter {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// True when no allowed domains were configured
    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a link to `url` may be followed
    pub fn allows(&self, url: &Url) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        match extract_domain(url) {
            Some(host) => self.patterns.iter().any(|p| domain_matches(p, &host)),
            None => false,
        }
    }
}
