//! Core record types
//!
//! This module defines the three record shapes the dataset is built from:
//! - `Profile`: per-user metadata scraped from the profile page
//! - `PostEntry`: one item of a user's activity stream
//! - `MergedPost`: a post entry with its owner's profile fields folded in,
//!   or a placeholder standing in for a profile that has no posts
//!
//! Field-level access goes through the `Field` vocabulary so that filters
//! and projections can address record fields by name.

use serde::{Deserialize, Serialize};

/// Per-user profile metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Unique identifier within a harvest run
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Membership label, e.g. "Member", "Director", "Not Member"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_status: Option<String>,
    /// Join time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_timestamp: Option<i64>,
    /// Last post time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_post_timestamp: Option<i64>,
}

impl Profile {
    /// Create a profile with only a username
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            member_status: None,
            join_timestamp: None,
            last_post_timestamp: None,
        }
    }

    /// Builder: set full name
    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    /// Builder: set member status
    pub fn member_status(mut self, status: impl Into<String>) -> Self {
        self.member_status = Some(status.into());
        self
    }

    /// Builder: set join timestamp
    pub fn joined(mut self, timestamp: i64) -> Self {
        self.join_timestamp = Some(timestamp);
        self
    }

    /// Builder: set last post timestamp
    pub fn last_posted(mut self, timestamp: i64) -> Self {
        self.last_post_timestamp = Some(timestamp);
        self
    }

    /// True when the site rendered no profile content for this user
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.member_status.is_none()
    }
}

/// One entry of a user's activity stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostEntry {
    /// Must equal the owning profile's username
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Absolute URL of the topic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Post time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_timestamp: Option<i64>,
    /// Excerpt text, absent when the excerpt was empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PostEntry {
    /// Create a post entry for a user
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            topic: None,
            topic_link: None,
            category: None,
            post_timestamp: None,
            text: None,
        }
    }

    /// Builder: set topic
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Builder: set topic link
    pub fn topic_link(mut self, link: impl Into<String>) -> Self {
        self.topic_link = Some(link.into());
        self
    }

    /// Builder: set category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder: set post timestamp
    pub fn posted(mut self, timestamp: i64) -> Self {
        self.post_timestamp = Some(timestamp);
        self
    }

    /// Builder: set excerpt text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A post entry merged with its owner's profile
///
/// Placeholder records (profiles without posts) carry only the profile
/// fields and `empty = Some(true)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergedPost {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_post_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty: Option<bool>,
}

impl MergedPost {
    /// Merge a post with its owner's profile.
    ///
    /// Post fields are laid down first; profile fields only fill keys the
    /// post does not have. The only shared key is `username`, which the
    /// merger has already checked for equality.
    pub fn from_parts(post: &PostEntry, profile: &Profile) -> Self {
        Self {
            username: post.username.clone(),
            full_name: profile.full_name.clone(),
            member_status: profile.member_status.clone(),
            join_timestamp: profile.join_timestamp,
            last_post_timestamp: profile.last_post_timestamp,
            topic: post.topic.clone(),
            topic_link: post.topic_link.clone(),
            category: post.category.clone(),
            post_timestamp: post.post_timestamp,
            text: post.text.clone(),
            empty: Some(false),
        }
    }

    /// Placeholder record for a profile with no posts
    pub fn placeholder(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            member_status: profile.member_status.clone(),
            join_timestamp: profile.join_timestamp,
            last_post_timestamp: profile.last_post_timestamp,
            topic: None,
            topic_link: None,
            category: None,
            post_timestamp: None,
            text: None,
            empty: Some(true),
        }
    }

    /// Borrow a text-valued field
    pub fn text_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Username => Some(self.username.as_str()),
            Field::FullName => self.full_name.as_deref(),
            Field::MemberStatus => self.member_status.as_deref(),
            Field::Topic => self.topic.as_deref(),
            Field::TopicLink => self.topic_link.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::Text => self.text.as_deref(),
            _ => None,
        }
    }

    /// Read a timestamp-valued field
    pub fn timestamp(&self, field: Field) -> Option<i64> {
        match field {
            Field::JoinTimestamp => self.join_timestamp,
            Field::LastPostTimestamp => self.last_post_timestamp,
            Field::PostTimestamp => self.post_timestamp,
            _ => None,
        }
    }

    /// Read a flag-valued field
    pub fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::Empty => self.empty,
            _ => None,
        }
    }

    /// Owned value of any field, `None` when the record lacks it
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field.kind() {
            FieldKind::Text => self
                .text_field(field)
                .map(|s| FieldValue::Text(s.to_string())),
            FieldKind::Timestamp => self.timestamp(field).map(FieldValue::Timestamp),
            FieldKind::Flag => self.flag(field).map(FieldValue::Flag),
        }
    }

    /// Check whether the field is present and equal to `value`
    pub fn field_equals(&self, field: Field, value: &FieldValue) -> bool {
        match value {
            FieldValue::Text(expected) => self.text_field(field) == Some(expected.as_str()),
            FieldValue::Timestamp(expected) => self.timestamp(field) == Some(*expected),
            FieldValue::Flag(expected) => self.flag(field) == Some(*expected),
        }
    }

    /// True for placeholder records of post-less profiles
    pub fn is_placeholder(&self) -> bool {
        self.empty == Some(true)
    }
}

/// Addressable fields of a merged record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Username,
    FullName,
    MemberStatus,
    JoinTimestamp,
    LastPostTimestamp,
    Topic,
    TopicLink,
    Category,
    PostTimestamp,
    Text,
    Empty,
}

/// The value type a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Timestamp,
    Flag,
}

impl Field {
    /// Get all fields in record order
    pub fn all() -> &'static [Field] {
        &[
            Field::Username,
            Field::FullName,
            Field::MemberStatus,
            Field::JoinTimestamp,
            Field::LastPostTimestamp,
            Field::Topic,
            Field::TopicLink,
            Field::Category,
            Field::PostTimestamp,
            Field::Text,
            Field::Empty,
        ]
    }

    /// The serialized key of this field
    pub fn name(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::FullName => "full_name",
            Field::MemberStatus => "member_status",
            Field::JoinTimestamp => "join_timestamp",
            Field::LastPostTimestamp => "last_post_timestamp",
            Field::Topic => "topic",
            Field::TopicLink => "topic_link",
            Field::Category => "category",
            Field::PostTimestamp => "post_timestamp",
            Field::Text => "text",
            Field::Empty => "empty",
        }
    }

    /// Look up a field by its serialized key
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.name() == name)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::JoinTimestamp | Field::LastPostTimestamp | Field::PostTimestamp => {
                FieldKind::Timestamp
            }
            Field::Empty => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Timestamp => write!(f, "timestamp"),
            FieldKind::Flag => write!(f, "boolean"),
        }
    }
}

/// A single field value, as used by equality predicates and projections
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// Epoch milliseconds
    Timestamp(i64),
    Flag(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Flag(_) => FieldKind::Flag,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Timestamp(ts) => write!(f, "{}", super::render::format_timestamp(*ts)),
            FieldValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile::new("John_Doe")
            .full_name("John Doe")
            .member_status("Member")
            .joined(1577836800000)
            .last_posted(1609459200000)
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::all() {
            assert_eq!(Field::from_name(field.name()), Some(*field));
        }
        assert_eq!(Field::from_name("post_time"), None);
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(Field::PostTimestamp.kind(), FieldKind::Timestamp);
        assert_eq!(Field::Empty.kind(), FieldKind::Flag);
        assert_eq!(Field::Category.kind(), FieldKind::Text);
    }

    #[test]
    fn test_from_parts_keeps_post_and_profile_fields() {
        let post = PostEntry::new("John_Doe")
            .topic("Big Topic")
            .category("Admin")
            .posted(1609459200000)
            .text("admin 123");
        let merged = MergedPost::from_parts(&post, &sample_profile());

        assert_eq!(merged.username, "John_Doe");
        assert_eq!(merged.full_name.as_deref(), Some("John Doe"));
        assert_eq!(merged.topic.as_deref(), Some("Big Topic"));
        assert_eq!(merged.join_timestamp, Some(1577836800000));
        assert_eq!(merged.post_timestamp, Some(1609459200000));
        assert_eq!(merged.empty, Some(false));
        assert!(!merged.is_placeholder());
    }

    #[test]
    fn test_placeholder() {
        let merged = MergedPost::placeholder(&Profile::new("B"));

        assert_eq!(merged.username, "B");
        assert_eq!(merged.empty, Some(true));
        assert!(merged.topic.is_none());
        assert!(merged.post_timestamp.is_none());
    }

    #[test]
    fn test_field_access() {
        let merged = MergedPost::placeholder(&sample_profile());

        assert_eq!(
            merged.get(Field::Username),
            Some(FieldValue::Text("John_Doe".to_string()))
        );
        assert_eq!(
            merged.get(Field::JoinTimestamp),
            Some(FieldValue::Timestamp(1577836800000))
        );
        assert_eq!(merged.get(Field::Empty), Some(FieldValue::Flag(true)));
        assert_eq!(merged.get(Field::Topic), None);

        assert!(merged.field_equals(Field::MemberStatus, &"Member".into()));
        assert!(!merged.field_equals(Field::MemberStatus, &"Director".into()));
        // Absent field never matches
        assert!(!merged.field_equals(Field::Topic, &"".into()));
        // Kind mismatch never matches
        assert!(!merged.field_equals(Field::Empty, &"true".into()));
    }

    #[test]
    fn test_profile_is_empty() {
        assert!(Profile::new("ghost").is_empty());
        assert!(!sample_profile().is_empty());
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let merged = MergedPost::placeholder(&Profile::new("B"));
        let json = serde_json::to_value(&merged).unwrap();

        assert_eq!(json, serde_json::json!({"username": "B", "empty": true}));

        let restored: MergedPost = serde_json::from_value(json).unwrap();
        assert_eq!(restored, merged);
    }
}
