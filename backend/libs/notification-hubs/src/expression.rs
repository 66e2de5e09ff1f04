//! Template expression classification
//!
//! Template values are either literals or expressions evaluated by the
//! hub against push variables at send time:
//!
//! - single tokens: `$(prop)`, `#(prop)`, `.(prop)`, `%(prop)`
//! - composites: `{'Hello ' + $(name) + '!'}`
//!
//! A value that looks like an expression but does not parse is rejected
//! rather than silently treated as a literal.

use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};

/// Classification of a template value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    Literal,
    Expression,
}

impl ExpressionType {
    pub fn is_literal(&self) -> bool {
        matches!(self, ExpressionType::Literal)
    }
}

const TOKEN_PREFIXES: [char; 4] = ['$', '#', '.', '%'];

/// Classify `value` and type-check it when it is an expression
pub fn validate(value: &str, version: ApiVersion) -> Result<ExpressionType> {
    let trimmed = value.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') && trimmed.len() >= 2 {
        if version < ApiVersion::V2013_08 {
            return Err(ValidationError::unsupported_expression(value));
        }
        parse_composite(&trimmed[1..trimmed.len() - 1], version)
            .ok_or_else(|| ValidationError::unsupported_expression(value))?;
        return Ok(ExpressionType::Expression);
    }

    if looks_like_token(trimmed) {
        let rest = parse_token(trimmed, version)
            .ok_or_else(|| ValidationError::unsupported_expression(value))?;
        if !rest.is_empty() {
            return Err(ValidationError::unsupported_expression(value));
        }
        return Ok(ExpressionType::Expression);
    }

    Ok(ExpressionType::Literal)
}

fn looks_like_token(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(prefix), Some('(')) if TOKEN_PREFIXES.contains(&prefix)
    )
}

/// Parses one token and returns the unconsumed remainder
fn parse_token(s: &str, version: ApiVersion) -> Option<&str> {
    if !looks_like_token(s) {
        return None;
    }
    if s.starts_with('%') && version < ApiVersion::V2013_08 {
        return None;
    }
    let body = &s[2..];
    let close = body.find(')')?;
    let name = &body[..close];
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return None;
    }
    Some(&body[close + 1..])
}

/// Parses a single-quoted literal and returns the unconsumed remainder
fn parse_quoted(s: &str) -> Option<&str> {
    let mut rest = s.strip_prefix('\'')?;
    loop {
        let idx = rest.find('\'')?;
        let after = &rest[idx + 1..];
        match after.strip_prefix('\'') {
            // '' is an escaped quote
            Some(next) => rest = next,
            None => return Some(after),
        }
    }
}

fn parse_composite(inner: &str, version: ApiVersion) -> Option<()> {
    let mut rest = inner.trim_start();
    loop {
        rest = if rest.starts_with('\'') {
            parse_quoted(rest)?
        } else {
            parse_token(rest, version)?
        };
        rest = rest.trim_start();
        if rest.is_empty() {
            return Some(());
        }
        rest = rest.strip_prefix('+')?.trim_start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        for value in ["Hello", "", "  ", "price: $5", "a{b}c", "ToastText01"] {
            assert_eq!(
                validate(value, ApiVersion::LATEST).unwrap(),
                ExpressionType::Literal,
                "{value}"
            );
        }
    }

    #[test]
    fn test_single_tokens() {
        for value in ["$(message)", "#(badge)", ".(loc_key)", "%(url)", "$(user.name)"] {
            assert_eq!(
                validate(value, ApiVersion::LATEST).unwrap(),
                ExpressionType::Expression,
                "{value}"
            );
        }
    }

    #[test]
    fn test_composite_expressions() {
        let value = "{'Hello ' + $(name) + '!'}";
        assert_eq!(
            validate(value, ApiVersion::LATEST).unwrap(),
            ExpressionType::Expression
        );
        assert_eq!(
            validate("{'It''s ' + #(count)}", ApiVersion::LATEST).unwrap(),
            ExpressionType::Expression
        );
    }

    #[test]
    fn test_malformed_expressions_are_rejected() {
        for value in ["$(", "$()", "$(a b)", "$(a)tail", "{$(a) +}", "{'open}", "{$(a) $(b)}"] {
            let err = validate(value, ApiVersion::LATEST).unwrap_err();
            assert_eq!(err.reason(), "UnsupportedExpression", "{value}");
        }
    }

    #[test]
    fn test_version_gating() {
        assert!(validate("%(url)", ApiVersion::V2013_04).is_err());
        assert!(validate("{$(a)}", ApiVersion::V2013_07).is_err());
        assert!(validate("$(a)", ApiVersion::V2013_04).is_ok());
    }
}
