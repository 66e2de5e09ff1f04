//! Boolean tag expressions used to target sends
//!
//! `(sports || news) && !muted`. The hub evaluates the expression; parsing
//! here is a local pre-check of the syntax and the tag-count limits, the
//! expression string itself is sent unmodified.

use std::collections::BTreeSet;

use crate::error::{Result, ValidationError};

/// Tags allowed in an expression made only of `||`
pub const MAX_OR_ONLY_TAGS: usize = 20;

/// Tags allowed in an expression using `&&` or `!`
pub const MAX_MIXED_TAGS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExpression {
    Tag(String),
    Not(Box<TagExpression>),
    And(Vec<TagExpression>),
    Or(Vec<TagExpression>),
}

impl TagExpression {
    pub fn parse(expression: &str) -> Result<Self> {
        let mut parser = Parser {
            input: expression,
            pos: 0,
        };
        let parsed = parser.parse_or()?;
        parser.skip_whitespace();
        if parser.pos != expression.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }

    /// Distinct tags referenced, ignoring case
    pub fn tag_count(&self) -> usize {
        let mut tags = BTreeSet::new();
        self.collect_tags(&mut tags);
        tags.len()
    }

    /// True when the expression uses neither `&&` nor `!`
    pub fn is_or_only(&self) -> bool {
        match self {
            TagExpression::Tag(_) => true,
            TagExpression::Not(_) | TagExpression::And(_) => false,
            TagExpression::Or(items) => items.iter().all(TagExpression::is_or_only),
        }
    }

    /// Enforces the 20 (OR-only) / 6 (mixed) tag limits
    pub fn validate_limits(&self) -> Result<()> {
        let limit = if self.is_or_only() {
            MAX_OR_ONLY_TAGS
        } else {
            MAX_MIXED_TAGS
        };
        if self.tag_count() > limit {
            return Err(ValidationError::LimitExceeded {
                reason: "TagExpressionTagCountExceeded",
                field: "tag expression".to_string(),
                limit,
            });
        }
        Ok(())
    }

    fn collect_tags(&self, out: &mut BTreeSet<String>) {
        match self {
            TagExpression::Tag(tag) => {
                out.insert(tag.to_lowercase());
            }
            TagExpression::Not(inner) => inner.collect_tags(out),
            TagExpression::And(items) | TagExpression::Or(items) => {
                for item in items {
                    item.collect_tags(out);
                }
            }
        }
    }
}

/// Parses and checks limits in one call
pub fn validate_tag_expression(expression: &str) -> Result<TagExpression> {
    let parsed = TagExpression::parse(expression)?;
    parsed.validate_limits()?;
    Ok(parsed)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> ValidationError {
        ValidationError::InvalidTagSyntax {
            reason: "InvalidTagExpression",
            message: format!("{} at position {} in '{}'", message, self.pos, self.input),
        }
    }

    fn parse_or(&mut self) -> Result<TagExpression> {
        let mut items = vec![self.parse_and()?];
        while self.eat("||") {
            items.push(self.parse_and()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            TagExpression::Or(items)
        })
    }

    fn parse_and(&mut self) -> Result<TagExpression> {
        let mut items = vec![self.parse_unary()?];
        while self.eat("&&") {
            items.push(self.parse_unary()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            TagExpression::And(items)
        })
    }

    fn parse_unary(&mut self) -> Result<TagExpression> {
        if self.eat("!") {
            return Ok(TagExpression::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat("(") {
            let inner = self.parse_or()?;
            if !self.eat(")") {
                return Err(self.error("expected ')'"));
            }
            return Ok(inner);
        }
        self.parse_tag()
    }

    fn parse_tag(&mut self) -> Result<TagExpression> {
        self.skip_whitespace();
        let rest = self.rest();
        let is_installation_tag = rest
            .get(..16)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("$InstallationId:"));
        let len = if is_installation_tag {
            rest.find('}').map(|idx| idx + 1).unwrap_or(rest.len())
        } else {
            rest.char_indices()
                .find(|(_, c)| !is_tag_char(*c))
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len())
        };
        let tag = &rest[..len];
        if tag.is_empty() || !super::is_valid_tag(tag) {
            return Err(self.error("expected a tag"));
        }
        self.pos += len;
        Ok(TagExpression::Tag(tag.to_string()))
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '@' | '#' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tag_is_an_expression() {
        let parsed = TagExpression::parse("sports").unwrap();
        assert_eq!(parsed, TagExpression::Tag("sports".to_string()));
        assert!(parsed.is_or_only());
        assert_eq!(parsed.tag_count(), 1);
    }

    #[test]
    fn test_precedence_and_grouping() {
        let parsed = TagExpression::parse("a || b && !c").unwrap();
        assert_eq!(
            parsed,
            TagExpression::Or(vec![
                TagExpression::Tag("a".into()),
                TagExpression::And(vec![
                    TagExpression::Tag("b".into()),
                    TagExpression::Not(Box::new(TagExpression::Tag("c".into()))),
                ]),
            ])
        );

        let grouped = TagExpression::parse("(a || b) && c").unwrap();
        assert!(matches!(grouped, TagExpression::And(_)));
        assert!(!grouped.is_or_only());
    }

    #[test]
    fn test_installation_tag_in_expression() {
        let parsed = TagExpression::parse("$InstallationId:{abc=1} || news").unwrap();
        assert_eq!(parsed.tag_count(), 2);
    }

    #[test]
    fn test_syntax_errors() {
        for expr in ["", "a &&", "(a || b", "a b", "a | b", "!", "a && (b))"] {
            let err = TagExpression::parse(expr).unwrap_err();
            assert_eq!(err.reason(), "InvalidTagExpression", "{expr}");
        }
    }

    #[test]
    fn test_or_only_limit() {
        let twenty = (0..20).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" || ");
        assert!(validate_tag_expression(&twenty).is_ok());

        let twenty_one = format!("{twenty} || t20");
        let err = validate_tag_expression(&twenty_one).unwrap_err();
        assert!(matches!(err, ValidationError::LimitExceeded { limit: 20, .. }));
    }

    #[test]
    fn test_mixed_limit() {
        assert!(validate_tag_expression("a && b && c && d && e && f").is_ok());
        let err = validate_tag_expression("a && b && c && d && e && f && g").unwrap_err();
        assert!(matches!(err, ValidationError::LimitExceeded { limit: 6, .. }));
    }

    #[test]
    fn test_repeated_tags_count_once() {
        let parsed = TagExpression::parse("a || A || a").unwrap();
        assert_eq!(parsed.tag_count(), 1);
    }
}
