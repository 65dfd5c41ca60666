//! Catalogue entities eligible for trending.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A listing that can be ranked: a skill, an agent, or any other catalogue
/// entry identified by a stable slug.
///
/// Only the identifier matters for ranking. Tags and the verified flag feed
/// a small baseline that orders entities which have no engagement at all.
///
/// # Examples
/// ```
/// use foragents_core::Entity;
///
/// let entity = Entity::new("agent-memory")
///     .with_tags(["memory", "storage"])
///     .verified(true);
///
/// assert_eq!(entity.id, "agent-memory");
/// assert_eq!(entity.tag_count(), 2);
/// assert!(entity.verified);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entity {
    /// Stable identifier, usually the listing slug.
    pub id: String,
    /// Free-form tags attached to the listing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    /// Whether the listing has been verified by the catalogue maintainers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub verified: bool,
}

impl Entity {
    /// Create an untagged, unverified entity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
            verified: false,
        }
    }

    /// Replace the entity's tags, consuming `self` for chaining.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the verified flag, consuming `self` for chaining.
    #[must_use]
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Number of tags attached to the entity.
    #[must_use]
    pub const fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn deserialises_with_optional_attributes_missing() {
        let entity: Entity = serde_json::from_str(r#"{"id":"skill-a"}"#).expect("parse entity");
        assert_eq!(entity, Entity::new("skill-a"));
    }

    #[rstest]
    fn deserialises_full_listing() {
        let entity: Entity =
            serde_json::from_str(r#"{"id":"skill-b","tags":["a","b","c"],"verified":true}"#)
                .expect("parse entity");
        assert_eq!(entity.tag_count(), 3);
        assert!(entity.verified);
    }
}
