//! Next-page discovery bounded by a page cap

use crate::config::PaginationRule;
use crate::extract::selector::{FieldSelector, SelectMode};
use crate::extract::Page;
use crate::url::resolve_link;
use crate::ConfigError;
use url::Url;

/// Position within one page sequence
///
/// Owned by the caller, one per start URL. Starts at page 1 and is only
/// advanced by [`Paginator::next_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: u32,
}

impl PaginationState {
    pub fn new() -> Self {
        Self { current_page: 1 }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled [`PaginationRule`]
#[derive(Debug, Clone)]
pub struct Paginator {
    selector: Option<FieldSelector>,
    max_pages: u32,
}

impl Paginator {
    /// Compiles the next-page selector; disabled rules compile to a no-op
    pub fn new(rule: &PaginationRule) -> Result<Self, ConfigError> {
        let selector = if rule.enabled {
            let selector = FieldSelector::parse_with_default(
                &rule.next_page_selector,
                SelectMode::Attr("href".to_string()),
            )
            .map_err(|message| ConfigError::InvalidSelector {
                field: "pagination.nextPageSelector".to_string(),
                message,
            })?;
            Some(selector)
        } else {
            None
        };

        Ok(Self {
            selector,
            max_pages: u32::try_from(rule.max_pages.max(1)).unwrap_or(u32::MAX),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.selector.is_some()
    }

    /// Decides the follow-up page for `page`
    ///
    /// Returns None when pagination is disabled, the page cap is reached, or
    /// no followable next link is present. Otherwise advances `state` and
    /// returns the link resolved against the page URL.
    pub fn next_page(&self, page: &Page, state: &mut PaginationState) -> Option<Url> {
        let selector = self.selector.as_ref()?;

        if state.current_page >= self.max_pages {
            tracing::debug!(
                url = %page.url(),
                "Reached page cap ({}), not following next link",
                self.max_pages
            );
            return None;
        }

        let href = selector.resolve(page.root())?;
        let next = resolve_link(&href, page.url())?;

        state.current_page += 1;
        Some(next)
    }
}
