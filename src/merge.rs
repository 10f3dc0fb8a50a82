//! Merger
//!
//! Combines a list of profiles with the positionally aligned list of their
//! post histories into one flat list of merged records:
//!
//! ```text
//! profiles[i] + histories[i] → one MergedPost per post
//!                            → one placeholder if histories[i] is empty
//! ```
//!
//! Alignment is checked up front. Any violation aborts the whole merge, so
//! callers never see a partial result.

use crate::records::{MergedPost, PostEntry, Profile};
use thiserror::Error;

/// Profile/post-history correspondence violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    /// The two input lists are not the same length
    #[error("Data integrity error: {profiles} profiles but {histories} post histories")]
    LengthMismatch { profiles: usize, histories: usize },

    /// A post's username differs from its owning profile's
    #[error(
        "Data integrity error: post by '{post}' found in history of profile '{profile}' (position {index})"
    )]
    UsernameMismatch {
        index: usize,
        profile: String,
        post: String,
    },
}

/// Check that profiles and histories are aligned pairwise
pub fn check_alignment(
    profiles: &[Profile],
    histories: &[Vec<PostEntry>],
) -> Result<(), DataIntegrityError> {
    if profiles.len() != histories.len() {
        return Err(DataIntegrityError::LengthMismatch {
            profiles: profiles.len(),
            histories: histories.len(),
        });
    }

    for (index, (profile, history)) in profiles.iter().zip(histories).enumerate() {
        if let Some(stray) = history.iter().find(|p| p.username != profile.username) {
            return Err(DataIntegrityError::UsernameMismatch {
                index,
                profile: profile.username.clone(),
                post: stray.username.clone(),
            });
        }
    }

    Ok(())
}

/// Merge profiles and their post histories into a flat record list
///
/// The output holds one record per post plus one placeholder per profile
/// with an empty history, in input order.
pub fn merge_records(
    profiles: &[Profile],
    histories: &[Vec<PostEntry>],
) -> Result<Vec<MergedPost>, DataIntegrityError> {
    check_alignment(profiles, histories)?;

    let capacity = histories.iter().map(|h| h.len().max(1)).sum();
    let mut merged = Vec::with_capacity(capacity);
    let mut placeholders = 0usize;

    for (profile, history) in profiles.iter().zip(histories) {
        if history.is_empty() {
            merged.push(MergedPost::placeholder(profile));
            placeholders += 1;
            continue;
        }
        merged.extend(history.iter().map(|post| MergedPost::from_parts(post, profile)));
    }

    tracing::debug!(
        profiles = profiles.len(),
        records = merged.len(),
        placeholders,
        "Merged profiles with post histories"
    );

    Ok(merged)
}
