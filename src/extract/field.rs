//! Field extraction: select, trim, refine, coerce

use crate::config::{FieldRule, ValueType};
use crate::extract::selector::FieldSelector;
use crate::extract::FieldValue;
use crate::{ConfigError, ExtractError};
use regex::Regex;
use scraper::ElementRef;

/// A compiled [`FieldRule`]
///
/// Built once per configuration and reused for every item on every page.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    name: String,
    selector: FieldSelector,
    value_type: ValueType,
    required: bool,
    pattern: Option<Regex>,
}

impl FieldExtractor {
    /// Compiles the selector and refinement pattern of `rule`
    pub fn compile(name: &str, rule: &FieldRule) -> Result<Self, ConfigError> {
        let selector =
            FieldSelector::parse(&rule.selector).map_err(|message| ConfigError::InvalidSelector {
                field: name.to_string(),
                message,
            })?;

        let pattern = rule
            .refinement_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Regex::new)
            .transpose()
            .map_err(|e| ConfigError::InvalidPattern {
                field: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            selector,
            value_type: rule.value_type,
            required: rule.required,
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Extracts this field from `node`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - the field resolved and coerced
    /// * `Ok(None)` - the selector matched nothing or the pattern did not match
    /// * `Err(ExtractError::Malformed)` - a value was present but failed coercion
    pub fn extract(&self, node: ElementRef<'_>) -> Result<Option<FieldValue>, ExtractError> {
        let raw = match self.selector.resolve(node) {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let mut text = raw.trim().to_string();

        if let Some(pattern) = &self.pattern {
            match refine(pattern, &text) {
                Some(refined) => text = refined,
                None => return Ok(None),
            }
        }

        coerce(&text, self.value_type)
            .map(Some)
            .map_err(|value| ExtractError::Malformed {
                field: self.name.clone(),
                value,
                value_type: self.value_type,
            })
    }
}

/// Applies a refinement pattern to already-trimmed text
///
/// Capture group 1 is used when the pattern defines groups, otherwise the
/// full match. Returns None when the pattern (or group 1) does not match.
pub fn refine(pattern: &Regex, text: &str) -> Option<String> {
    let captures = pattern.captures(text)?;

    let matched = if pattern.captures_len() > 1 {
        captures.get(1)?
    } else {
        captures.get(0)?
    };

    Some(matched.as_str().to_string())
}

/// Coerces text to `value_type`; the error carries the offending text
pub fn coerce(text: &str, value_type: ValueType) -> Result<FieldValue, String> {
    match value_type {
        ValueType::String => Ok(FieldValue::String(text.to_string())),
        ValueType::Float => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(FieldValue::Float)
            .ok_or_else(|| text.to_string()),
        ValueType::Int => text
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn extract(html: &str, rule: FieldRule) -> Result<Option<FieldValue>, ExtractError> {
        let doc = Html::parse_document(html);
        FieldExtractor::compile("f", &rule)
            .unwrap()
            .extract(doc.root_element())
    }

    #[test]
    fn test_float_coercion() {
        let rule = FieldRule::new(".price").value_type(ValueType::Float);
        assert_eq!(
            extract(r#"<span class="price">37.71</span>"#, rule.clone()).unwrap(),
            Some(FieldValue::Float(37.71))
        );

        let err = extract(r#"<span class="price">abc</span>"#, rule).unwrap_err();
        assert_eq!(
            err,
            ExtractError::Malformed {
                field: "f".to_string(),
                value: "abc".to_string(),
                value_type: ValueType::Float,
            }
        );
    }

    #[test]
    fn test_int_coercion() {
        let rule = FieldRule::new(".vol").value_type(ValueType::Int);
        assert_eq!(
            extract(r#"<i class="vol"> 1200 </i>"#, rule.clone()).unwrap(),
            Some(FieldValue::Int(1200))
        );
        assert!(extract(r#"<i class="vol">12.5</i>"#, rule).is_err());
    }

    #[test]
    fn test_refinement_full_match() {
        let rule = FieldRule::new(".p::text").refine(r"[\d\.]+");
        assert_eq!(
            extract(r#"<p class="p">Price: 42.50 CNY</p>"#, rule).unwrap(),
            Some(FieldValue::String("42.50".to_string()))
        );
    }

    #[test]
    fn test_refinement_capture_group() {
        let rule = FieldRule::new(".p")
            .refine(r"Target:\s*([\d\.]+)")
            .value_type(ValueType::Float);
        assert_eq!(
            extract(r#"<p class="p">Rating: Buy, Target: 128.4</p>"#, rule).unwrap(),
            Some(FieldValue::Float(128.4))
        );
    }

    #[test]
    fn test_refinement_no_match_is_absent() {
        let rule = FieldRule::new(".p").refine(r"\d+").value_type(ValueType::Int);
        assert_eq!(extract(r#"<p class="p">suspended</p>"#, rule).unwrap(), None);
    }

    #[test]
    fn test_non_participating_group_is_absent() {
        let re = Regex::new(r"(\d+)?x").unwrap();
        assert_eq!(refine(&re, "x"), None);
        assert_eq!(refine(&re, "12x"), Some("12".to_string()));
    }

    #[test]
    fn test_missing_node_is_absent() {
        let rule = FieldRule::new(".nothing").value_type(ValueType::Float);
        assert_eq!(extract(r#"<p>1.0</p>"#, rule).unwrap(), None);
    }

    #[test]
    fn test_zero_and_empty_are_present() {
        let rule = FieldRule::new(".chg").value_type(ValueType::Float);
        assert_eq!(
            extract(r#"<b class="chg">0.00</b>"#, rule).unwrap(),
            Some(FieldValue::Float(0.0))
        );

        let rule = FieldRule::new(".note");
        assert_eq!(
            extract(r#"<b class="note">   </b>"#, rule).unwrap(),
            Some(FieldValue::String(String::new()))
        );
    }

    #[test]
    fn test_attribute_value() {
        let rule = FieldRule::new("a.detail::attr(href)");
        assert_eq!(
            extract(r#"<a class="detail" href=" /r/1.html ">go</a>"#, rule).unwrap(),
            Some(FieldValue::String("/r/1.html".to_string()))
        );
    }

    #[test]
    fn test_non_finite_float_is_malformed() {
        assert!(coerce("NaN", ValueType::Float).is_err());
        assert!(coerce("inf", ValueType::Float).is_err());
        assert_eq!(coerce("-1.5", ValueType::Float), Ok(FieldValue::Float(-1.5)));
    }

    #[test]
    fn test_compile_errors() {
        let bad_selector = FieldRule::new("div[[");
        assert!(matches!(
            FieldExtractor::compile("x", &bad_selector),
            Err(ConfigError::InvalidSelector { .. })
        ));

        let bad_pattern = FieldRule::new("div").refine("([0-9]");
        assert!(matches!(
            FieldExtractor::compile("x", &bad_pattern),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
