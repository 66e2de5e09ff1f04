//! Tags and tag lists
//!
//! A tag is `[\w\-_@#.:]+`, or the reserved form `$InstallationId:{value}`
//! where the value additionally admits `=`. A tag list is the
//! comma-joined wire form; it may carry at most one installation tag.

pub mod expression;

pub use expression::TagExpression;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum length of a single tag
pub const MAX_TAG_LENGTH: usize = 120;

const TAG: &str = r"[\w\-_@#.:]+";
const INSTALLATION_TAG: &str = r"\$InstallationId:\{[\w\-_@#.:=]+\}";

// Installation tag first, followed by literal tags
static LEADING_INSTALLATION_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(?:{INSTALLATION_TAG}|{TAG})(?:,{TAG})*$"))
        .expect("leading installation tag list regex")
});

// Literal tags, then exactly one installation tag, then literal tags
static EMBEDDED_INSTALLATION_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{TAG}(?:,{TAG})*,{INSTALLATION_TAG}(?:,{TAG})*$"
    ))
    .expect("embedded installation tag list regex")
});

static SINGLE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^(?:{INSTALLATION_TAG}|{TAG})$")).expect("single tag regex")
});

/// Whether a comma-joined tag list matches the tag-list grammar
///
/// The empty string is a valid (empty) list.
pub fn validate_tags(tags: &str) -> bool {
    tags.is_empty()
        || LEADING_INSTALLATION_LIST.is_match(tags)
        || EMBEDDED_INSTALLATION_LIST.is_match(tags)
}

/// Number of comma-separated segments; does not validate
pub fn tag_count(tags: &str) -> usize {
    tags.split(',').count()
}

/// Whether a single tag matches the tag grammar
pub fn is_valid_tag(tag: &str) -> bool {
    SINGLE_TAG.is_match(tag)
}

/// Case-insensitive set of tags, ordered for a stable wire form
///
/// The first spelling inserted for a tag is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    tags: BTreeMap<String, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an equal tag (ignoring case) is already present
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let key = tag.to_lowercase();
        if self.tags.contains_key(&key) {
            return false;
        }
        self.tags.insert(key, tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(&tag.to_lowercase()).is_some()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(&tag.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.values().map(String::as_str)
    }

    /// Comma-joined wire form
    pub fn to_tags_string(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }

    /// Splits a comma-joined string without validating it
    pub fn from_tags_string(tags: &str) -> Self {
        tags.split(',')
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.tags.into_values().collect()
    }
}
