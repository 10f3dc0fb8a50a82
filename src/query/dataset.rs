//! Post Dataset
//!
//! The query engine: an ordered, immutable view over merged records.
//!
//! Records are kept sorted ascending by `post_timestamp`; records without
//! one (placeholders) sort after every timestamped record. The sort is
//! stable, so ties keep their input order.
//!
//! Every filter or search call materializes a new list and wraps it in a
//! new `PostDataset`; the dataset it was called on is never modified.
//!
//! # Example
//!
//! ```rust
//! use discourse_dataset::query::{PostDataset, PostFilter};
//! use discourse_dataset::records::{Field, FieldValue, MergedPost, PostEntry, Profile};
//!
//! let profile = Profile::new("A").joined(1000);
//! let posts = vec![
//!     MergedPost::from_parts(&PostEntry::new("A").topic("X").posted(2000), &profile),
//!     MergedPost::from_parts(&PostEntry::new("A").topic("Y").posted(4000), &profile),
//! ];
//! let dataset = PostDataset::from_records(posts);
//!
//! let x = dataset.filter(&PostFilter::new().topic("X")).unwrap();
//! assert_eq!(x.len(), 1);
//! assert!(dataset.distinct(Field::Topic).contains(&FieldValue::from("Y")));
//! ```

use crate::query::error::{QueryError, QueryResult};
use crate::query::filter::PostFilter;
use crate::records::{Field, FieldValue, MergedPost};
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Index;
use std::slice::SliceIndex;

/// Sorted, filterable collection of merged records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostDataset {
    posts: Vec<MergedPost>,
}

impl PostDataset {
    /// Wrap a raw list of merged records, sorting it by post time
    pub fn from_records(mut posts: Vec<MergedPost>) -> Self {
        sort_by_post_time(&mut posts);
        Self { posts }
    }

    /// Apply a filter, returning a new dataset over the matching records
    ///
    /// No matches yields an empty dataset. A malformed filter fails with
    /// [`QueryError::InvalidFilterArgument`] and leaves `self` untouched.
    pub fn filter(&self, filter: &PostFilter) -> QueryResult<Self> {
        let matched = filter.apply(&self.posts)?;
        tracing::debug!(
            filter = %filter,
            matched = matched.len(),
            scanned = self.posts.len(),
            "Filtered dataset"
        );
        Ok(Self::from_records(matched))
    }

    /// Case-insensitive substring search over `text` and `topic`
    ///
    /// A record matches when any term occurs in either field. Records
    /// lacking `text` or `topic` are never returned.
    pub fn search<S: AsRef<str>>(&self, terms: &[S]) -> QueryResult<Self> {
        if terms.is_empty() {
            return Err(QueryError::InvalidFilterArgument(
                "search needs at least one term".to_string(),
            ));
        }

        let needles: Vec<String> = terms.iter().map(|t| t.as_ref().to_lowercase()).collect();

        let matched: Vec<MergedPost> = self
            .posts
            .iter()
            .filter(|post| match (&post.text, &post.topic) {
                (Some(text), Some(topic)) => {
                    let text = text.to_lowercase();
                    let topic = topic.to_lowercase();
                    needles
                        .iter()
                        .any(|n| text.contains(n.as_str()) || topic.contains(n.as_str()))
                }
                _ => false,
            })
            .cloned()
            .collect();

        tracing::debug!(terms = ?needles, matched = matched.len(), "Searched dataset");
        Ok(Self::from_records(matched))
    }

    /// Distinct values of a field across the records that have it
    pub fn distinct(&self, field: Field) -> BTreeSet<FieldValue> {
        self.posts.iter().filter_map(|post| post.get(field)).collect()
    }

    /// Distinct values of a field addressed by its serialized name
    pub fn distinct_by_name(&self, name: &str) -> QueryResult<BTreeSet<FieldValue>> {
        let field = Field::from_name(name).ok_or_else(|| QueryError::UnknownField(name.to_string()))?;
        Ok(self.distinct(field))
    }

    /// Record at a position in sort order
    pub fn get(&self, index: usize) -> Option<&MergedPost> {
        self.posts.get(index)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Fresh iterator in ascending post time
    pub fn iter(&self) -> std::slice::Iter<'_, MergedPost> {
        self.posts.iter()
    }

    /// Read-only view of the sorted records
    pub fn records(&self) -> &[MergedPost] {
        &self.posts
    }

    /// Take the sorted records out of the dataset
    pub fn into_records(self) -> Vec<MergedPost> {
        self.posts
    }

    /// Count of placeholder records (profiles without posts)
    pub fn placeholder_count(&self) -> usize {
        self.posts.iter().filter(|p| p.is_placeholder()).count()
    }
}

/// Stable sort by post time, records without one last
fn sort_by_post_time(posts: &mut [MergedPost]) {
    posts.sort_by_key(|p| (p.post_timestamp.is_none(), p.post_timestamp));
}

impl<I: SliceIndex<[MergedPost]>> Index<I> for PostDataset {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.posts[index]
    }
}

impl<'a> IntoIterator for &'a PostDataset {
    type Item = &'a MergedPost;
    type IntoIter = std::slice::Iter<'a, MergedPost>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

impl IntoIterator for PostDataset {
    type Item = MergedPost;
    type IntoIter = std::vec::IntoIter<MergedPost>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.into_iter()
    }
}

impl FromIterator<MergedPost> for PostDataset {
    fn from_iter<T: IntoIterator<Item = MergedPost>>(iter: T) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

impl From<Vec<MergedPost>> for PostDataset {
    fn from(posts: Vec<MergedPost>) -> Self {
        Self::from_records(posts)
    }
}
