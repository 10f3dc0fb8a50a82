//! Human-readable projection of merged records
//!
//! Rendering never touches the source record: `MergedPost::render` borrows
//! it and builds a separate view with timestamps formatted as UTC dates.

use super::types::MergedPost;
use chrono::DateTime;
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format epoch milliseconds as a UTC date-time string
pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Display view of a merged record
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedPost<'a> {
    pub username: &'a str,
    pub full_name: Option<&'a str>,
    pub member_status: Option<&'a str>,
    pub join_time: Option<String>,
    pub last_post_time: Option<String>,
    pub topic: Option<&'a str>,
    pub topic_link: Option<&'a str>,
    pub category: Option<&'a str>,
    pub post_time: Option<String>,
    pub text: Option<&'a str>,
    pub empty: Option<bool>,
}

impl MergedPost {
    /// Build a display view with human-readable timestamps
    pub fn render(&self) -> RenderedPost<'_> {
        RenderedPost {
            username: &self.username,
            full_name: self.full_name.as_deref(),
            member_status: self.member_status.as_deref(),
            join_time: self.join_timestamp.map(format_timestamp),
            last_post_time: self.last_post_timestamp.map(format_timestamp),
            topic: self.topic.as_deref(),
            topic_link: self.topic_link.as_deref(),
            category: self.category.as_deref(),
            post_time: self.post_timestamp.map(format_timestamp),
            text: self.text.as_deref(),
            empty: self.empty,
        }
    }
}

impl std::fmt::Display for MergedPost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = self.render();
        write!(f, "{}", view.username)?;
        if let Some(time) = &view.post_time {
            write!(f, " @ {}", time)?;
        }
        if let Some(topic) = view.topic {
            write!(f, " [{}]", topic)?;
        }
        if let Some(category) = view.category {
            write!(f, " ({})", category)?;
        }
        if view.empty == Some(true) {
            write!(f, " <no posts>")?;
        }
        Ok(())
    }
}
