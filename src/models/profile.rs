use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};
use thiserror::Error;

const MAX_TAG_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagNameError {
    #[error("tag name must not be empty")]
    Empty,
    #[error("tag name must not contain whitespace: {0:?}")]
    Whitespace(String),
    #[error("tag name longer than 100 characters")]
    TooLong,
}

/// Validated tag name used as a profile key
///
/// Names are non-empty, at most 100 characters and contain no whitespace,
/// matching the `tag.name` column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    pub fn new(name: impl Into<String>) -> Result<Self, TagNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TagNameError::Empty);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(TagNameError::Whitespace(name));
        }
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(TagNameError::TooLong);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TagName {
    type Error = TagNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(name: TagName) -> Self {
        name.0
    }
}

/// Per-request weighted tag vector derived from survey answers
///
/// Sparse: tags that were never contributed are absent and weigh 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Profile {
    weights: BTreeMap<TagName, i64>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the accumulated weight of `tag`
    pub fn add(&mut self, tag: TagName, amount: i64) {
        *self.weights.entry(tag).or_insert(0) += amount;
    }

    pub fn weight(&self, tag: &TagName) -> i64 {
        self.weights.get(tag).copied().unwrap_or(0)
    }

    /// Tags carrying a nonzero weight, in name order
    pub fn active_tags(&self) -> impl Iterator<Item = (&TagName, i64)> {
        self.weights
            .iter()
            .filter(|(_, weight)| **weight != 0)
            .map(|(tag, weight)| (tag, *weight))
    }

    /// True when no tag carries a nonzero weight
    pub fn is_empty(&self) -> bool {
        self.active_tags().next().is_none()
    }
}

impl FromIterator<(TagName, i64)> for Profile {
    fn from_iter<I: IntoIterator<Item = (TagName, i64)>>(iter: I) -> Self {
        let mut profile = Profile::new();
        for (tag, amount) in iter {
            profile.add(tag, amount);
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    #[test]
    fn test_tag_name_rejects_empty() {
        assert_eq!(TagName::new(""), Err(TagNameError::Empty));
    }

    #[test]
    fn test_tag_name_rejects_whitespace() {
        assert!(matches!(
            TagName::new("street food"),
            Err(TagNameError::Whitespace(_))
        ));
    }

    #[test]
    fn test_tag_name_rejects_overlong() {
        let name = "x".repeat(MAX_TAG_NAME_LEN + 1);
        assert_eq!(TagName::new(name), Err(TagNameError::TooLong));
    }

    #[test]
    fn test_tag_name_deserialize_validates() {
        let ok: TagName = serde_json::from_str("\"beach\"").unwrap();
        assert_eq!(ok.as_str(), "beach");
        assert!(serde_json::from_str::<TagName>("\"\"").is_err());
    }

    #[test]
    fn test_profile_accumulates() {
        let mut profile = Profile::new();
        profile.add(tag("beach"), 2);
        profile.add(tag("beach"), 3);
        assert_eq!(profile.weight(&tag("beach")), 5);
        assert_eq!(profile.weight(&tag("mountain")), 0);
    }

    #[test]
    fn test_zero_weights_are_inactive() {
        let profile: Profile = [(tag("beach"), 0), (tag("solo"), 1)].into_iter().collect();
        let active: Vec<_> = profile.active_tags().map(|(t, w)| (t.as_str(), w)).collect();
        assert_eq!(active, vec![("solo", 1)]);
        assert!(!profile.is_empty());

        let only_zero: Profile = [(tag("beach"), 0)].into_iter().collect();
        assert!(only_zero.is_empty());
    }

    #[test]
    fn test_profile_serializes_as_map() {
        let profile: Profile = [(tag("sightseeing"), 3), (tag("beach"), 2)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"beach":2,"sightseeing":3}"#);
    }
}
