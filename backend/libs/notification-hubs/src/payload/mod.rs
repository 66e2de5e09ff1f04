//! Body template shape detection and expression scanning
//!
//! XML bodies (WNS, MPNS) are walked element by element and every template
//! expression is located back in the raw body so the hub can substitute it
//! in place. JSON bodies are walked the same way without offset tracking.

pub mod xml;

use std::collections::HashMap;

use quick_xml::escape::{escape, partial_escape};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};
use crate::expression::{self, ExpressionType};

pub use xml::XmlElement;

/// Trimmed body starts with `<`
pub fn is_xml_payload(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Trimmed body starts with `{` and ends with `}`
pub fn is_json_object_payload(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Location of a template expression inside the raw body
///
/// `start` and `length` are byte offsets of the expression as written in
/// the body (escaped form), `expression` is its unescaped text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateExpression {
    pub start: usize,
    pub length: usize,
    pub expression: String,
}

/// Parses an XML body, mapping parse failures to `error_reason`
pub fn parse_xml(body: &str, error_reason: &'static str) -> Result<XmlElement> {
    xml::parse(body).map_err(|e| {
        ValidationError::malformed(error_reason, format!("body template is not valid XML: {}", e))
    })
}

/// Validates every attribute and leaf value of an XML body and returns
/// the located expressions in document order
pub fn scan_xml_template(body: &str, version: ApiVersion) -> Result<Vec<TemplateExpression>> {
    let root = parse_xml(body, "InvalidXmlPayload")?;
    let mut locator = ExpressionLocator::new(body);

    root.walk(&mut |el: &XmlElement| -> Result<()> {
        for (_, value) in &el.attributes {
            locator.check(value, version)?;
        }
        if el.is_leaf() && !el.text.is_empty() {
            locator.check(&el.text, version)?;
        }
        Ok(())
    })?;

    debug!(
        expressions = locator.found.len(),
        "Scanned XML body template"
    );
    Ok(locator.found)
}

/// Validates every leaf value of a JSON body template
pub fn scan_json_template(body: &str, version: ApiVersion) -> Result<()> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ValidationError::malformed(
            "BodyTemplateDeserializeFailed",
            format!("failed to deserialize body template: {}", e),
        )
    })?;
    walk_json(&value, version)
}

fn walk_json(value: &Value, version: ApiVersion) -> Result<()> {
    match value {
        Value::Object(map) => map.values().try_for_each(|v| walk_json(v, version)),
        Value::Array(items) => items.iter().try_for_each(|v| walk_json(v, version)),
        Value::String(s) if !s.is_empty() => expression::validate(s, version).map(|_| ()),
        Value::Number(n) => expression::validate(&n.to_string(), version).map(|_| ()),
        Value::Bool(b) => expression::validate(&b.to_string(), version).map(|_| ()),
        _ => Ok(()),
    }
}

/// Finds successive occurrences of expressions in the raw body
struct ExpressionLocator<'a> {
    body: &'a str,
    last_offsets: HashMap<String, usize>,
    found: Vec<TemplateExpression>,
}

impl<'a> ExpressionLocator<'a> {
    fn new(body: &'a str) -> Self {
        Self {
            body,
            last_offsets: HashMap::new(),
            found: Vec::new(),
        }
    }

    fn check(&mut self, value: &str, version: ApiVersion) -> Result<()> {
        if expression::validate(value, version)? == ExpressionType::Literal {
            return Ok(());
        }

        let from = match self.last_offsets.get(value) {
            Some(previous) => next_char_boundary(self.body, previous + 1),
            None => 0,
        };

        let partial = partial_escape(value);
        let full = escape(value);
        let located = [partial.as_ref(), full.as_ref()]
            .into_iter()
            .find_map(|candidate| {
                self.body
                    .get(from..)
                    .and_then(|rest| rest.find(candidate))
                    .map(|idx| (from + idx, candidate.len()))
            });

        let (start, length) = located.ok_or_else(|| ValidationError::unsupported_expression(value))?;
        self.last_offsets.insert(value.to_string(), start);
        self.found.push(TemplateExpression {
            start,
            length,
            expression: value.to_string(),
        });
        Ok(())
    }
}

fn next_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx.min(s.len())
}
