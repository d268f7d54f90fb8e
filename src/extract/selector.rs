//! Selector strings with an extraction mode
//!
//! A field selector is a CSS selector optionally followed by a pseudo
//! suffix choosing what to read from the matched element:
//!
//! - `td.price::text` reads the element's own text nodes
//! - `a.next::attr(href)` reads an attribute
//! - `td.price` uses the caller's default mode
//!
//! The CSS part may be empty (`::attr(data-id)`), in which case the node the
//! selector is applied to is read directly.

use scraper::{ElementRef, Selector};

/// What to read from a matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectMode {
    Text,
    Attr(String),
}

/// A parsed field selector
#[derive(Debug, Clone)]
pub struct FieldSelector {
    css: Option<Selector>,
    mode: SelectMode,
}

impl FieldSelector {
    /// Parses a selector; bare selectors read text
    pub fn parse(source: &str) -> Result<Self, String> {
        Self::parse_with_default(source, SelectMode::Text)
    }

    /// Parses a selector, using `default` when no pseudo suffix is present
    pub fn parse_with_default(source: &str, default: SelectMode) -> Result<Self, String> {
        let source = source.trim();
        let (css, mode) = split_mode(source)?;
        let css = css.trim();

        let css = if css.is_empty() {
            None
        } else {
            Some(Selector::parse(css).map_err(|e| format!("'{}': {}", css, e))?)
        };

        Ok(Self {
            css,
            mode: mode.unwrap_or(default),
        })
    }

    pub fn mode(&self) -> &SelectMode {
        &self.mode
    }

    /// Resolves the raw (untrimmed) value within `node`
    ///
    /// Text mode returns the concatenated direct text nodes of the first
    /// matching element that has any. Attribute mode returns the attribute
    /// of the first matching element carrying it. `None` means nothing
    /// resolved.
    pub fn resolve(&self, node: ElementRef<'_>) -> Option<String> {
        match &self.css {
            Some(css) => node.select(css).find_map(|el| self.read(el)),
            None => self.read(node),
        }
    }

    /// Every resolved value within `node`, in document order
    pub fn resolve_all(&self, node: ElementRef<'_>) -> Vec<String> {
        match &self.css {
            Some(css) => node.select(css).filter_map(|el| self.read(el)).collect(),
            None => self.read(node).into_iter().collect(),
        }
    }

    fn read(&self, element: ElementRef<'_>) -> Option<String> {
        match &self.mode {
            SelectMode::Text => own_text(element),
            SelectMode::Attr(name) => element.value().attr(name).map(str::to_string),
        }
    }
}

/// Splits off a trailing `::text` / `::attr(name)` suffix
fn split_mode(source: &str) -> Result<(&str, Option<SelectMode>), String> {
    if let Some(css) = source.strip_suffix("::text") {
        return Ok((css, Some(SelectMode::Text)));
    }

    if let Some(start) = source.rfind("::attr(") {
        let rest = &source[start + "::attr(".len()..];
        let name = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("'{}': unterminated ::attr(", source))?
            .trim();

        if name.is_empty() {
            return Err(format!("'{}': empty attribute name", source));
        }

        return Ok((&source[..start], Some(SelectMode::Attr(name.to_string()))));
    }

    Ok((source, None))
}

/// Direct text children of an element, or None if it has none
fn own_text(element: ElementRef<'_>) -> Option<String> {
    let mut found = false;
    let mut text = String::new();

    for child in element.children() {
        if let Some(t) = child.value().as_text() {
            found = true;
            text.push_str(t);
        }
    }

    found.then_some(text)
}
