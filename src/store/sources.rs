//! Source files
//!
//! The converter stage writes one JSON file per user into two sibling
//! directories:
//!
//! ```text
//! json_files/
//!   profiles/<username>.json         one object
//!   post_histories/<username>.json   array of objects
//! ```
//!
//! `DatasetSources` holds the positionally aligned path lists; the loaders
//! here turn them into typed records with timestamps normalized.

use crate::merge::DataIntegrityError;
use crate::records::{decode_record, decode_records, PostEntry, Profile};
use crate::store::error::{StoreError, StoreResult};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Positionally aligned profile and post-history file locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSources {
    profiles: Vec<PathBuf>,
    /// `None` stands for a user with no activity file (empty history)
    post_histories: Vec<Option<PathBuf>>,
}

impl DatasetSources {
    /// Build from explicit path lists; `profiles[i]` owns `post_histories[i]`
    pub fn new(profiles: Vec<PathBuf>, post_histories: Vec<PathBuf>) -> Self {
        Self {
            profiles,
            post_histories: post_histories.into_iter().map(Some).collect(),
        }
    }

    /// Pair every `*.json` profile with the same-named post-history file
    ///
    /// Profiles are ordered by file name. A profile without a post-history
    /// file is paired with an empty history.
    pub fn discover(profiles_dir: &Path, post_histories_dir: &Path) -> StoreResult<Self> {
        for dir in [profiles_dir, post_histories_dir] {
            if !dir.is_dir() {
                return Err(StoreError::MissingDirectory(dir.to_path_buf()));
            }
        }

        let mut profiles = Vec::new();
        let entries =
            std::fs::read_dir(profiles_dir).map_err(|e| StoreError::io(profiles_dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(profiles_dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                profiles.push(path);
            }
        }
        profiles.sort();

        let mut post_histories = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            let history = profile
                .file_name()
                .map(|name| post_histories_dir.join(name))
                .filter(|candidate| candidate.is_file());
            if history.is_none() {
                tracing::warn!(profile = ?profile, "No post history file; treating as empty");
            }
            post_histories.push(history);
        }

        tracing::info!(
            profiles = profiles.len(),
            histories = post_histories.iter().flatten().count(),
            "Discovered dataset sources"
        );

        Ok(Self {
            profiles,
            post_histories,
        })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[PathBuf] {
        &self.profiles
    }

    pub fn post_histories(&self) -> &[Option<PathBuf>] {
        &self.post_histories
    }
}

fn read_json(path: &Path) -> StoreResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))
}

/// Load one profile file
pub fn load_profile(path: &Path) -> StoreResult<Profile> {
    decode_record(read_json(path)?).map_err(|e| StoreError::record(path, e))
}

/// Load one post-history file
pub fn load_post_history(path: &Path) -> StoreResult<Vec<PostEntry>> {
    decode_records(read_json(path)?).map_err(|e| StoreError::record(path, e))
}

/// Load every profile and post history named by `sources`
pub fn load_sources(sources: &DatasetSources) -> StoreResult<(Vec<Profile>, Vec<Vec<PostEntry>>)> {
    if sources.profiles.len() != sources.post_histories.len() {
        return Err(DataIntegrityError::LengthMismatch {
            profiles: sources.profiles.len(),
            histories: sources.post_histories.len(),
        }
        .into());
    }

    let profiles = sources
        .profiles
        .iter()
        .map(|path| load_profile(path))
        .collect::<StoreResult<Vec<_>>>()?;

    let histories = sources
        .post_histories
        .iter()
        .map(|path| match path {
            Some(path) => load_post_history(path),
            None => Ok(Vec::new()),
        })
        .collect::<StoreResult<Vec<_>>>()?;

    tracing::info!(
        profiles = profiles.len(),
        empty_profiles = profiles.iter().filter(|p| p.is_empty()).count(),
        posts = histories.iter().map(Vec::len).sum::<usize>(),
        "Loaded dataset sources"
    );

    Ok((profiles, histories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_profile_normalizes_timestamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Matt_Cliffe.json");
        write(
            &path,
            r#"{"username": "Matt_Cliffe", "full_name": "Matt Cliffe",
                "member_status": "Not Member",
                "join_timestamp": "1550691826355", "last_post_timestamp": "1556527466920"}"#,
        );

        let profile = load_profile(&path).unwrap();

        assert_eq!(profile.username, "Matt_Cliffe");
        assert_eq!(profile.full_name.as_deref(), Some("Matt Cliffe"));
        assert_eq!(profile.join_timestamp, Some(1550691826355));
        assert_eq!(profile.last_post_timestamp, Some(1556527466920));
    }

    #[test]
    fn test_load_post_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Matt_Cliffe.json");
        write(
            &path,
            r#"[{"username": "Matt_Cliffe", "topic": "Joining South London Makerspace",
                 "topic_link": "https://discourse.southlondonmakerspace.org/t/joining-south-london-makerspace/1234",
                 "category": "Admin", "post_timestamp": "1550859165213", "text": "Lorem ipsum"}]"#,
        );

        let posts = load_post_history(&path).unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].category.as_deref(), Some("Admin"));
        assert_eq!(posts[0].post_timestamp, Some(1550859165213));
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nobody.json");
        assert!(matches!(load_profile(&missing), Err(StoreError::Io { .. })));

        let garbled = dir.path().join("garbled.json");
        write(&garbled, "{not json");
        assert!(matches!(load_profile(&garbled), Err(StoreError::Json { .. })));

        let bad_time = dir.path().join("bad_time.json");
        write(&bad_time, r#"{"username": "x", "join_timestamp": "soon"}"#);
        assert!(matches!(load_profile(&bad_time), Err(StoreError::Record { .. })));
    }

    #[test]
    fn test_discover_pairs_by_file_name() {
        let dir = tempdir().unwrap();
        let profiles_dir = dir.path().join("profiles");
        let histories_dir = dir.path().join("post_histories");
        write(&profiles_dir.join("bob.json"), r#"{"username": "bob"}"#);
        write(&profiles_dir.join("alice.json"), r#"{"username": "alice"}"#);
        write(&profiles_dir.join("notes.txt"), "ignored");
        write(&histories_dir.join("alice.json"), "[]");

        let sources = DatasetSources::discover(&profiles_dir, &histories_dir).unwrap();

        assert_eq!(sources.len(), 2);
        assert!(sources.profiles()[0].ends_with("alice.json"));
        assert!(sources.profiles()[1].ends_with("bob.json"));
        assert!(sources.post_histories()[0].is_some());
        assert!(sources.post_histories()[1].is_none());
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = tempdir().unwrap();
        let err = DatasetSources::discover(&dir.path().join("profiles"), dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::MissingDirectory(_)));
    }

    #[test]
    fn test_load_sources_missing_history_is_empty() {
        let dir = tempdir().unwrap();
        let profiles_dir = dir.path().join("profiles");
        let histories_dir = dir.path().join("post_histories");
        write(&profiles_dir.join("A.json"), r#"{"username": "A"}"#);
        write(
            &histories_dir.join("A.json"),
            r#"[{"username": "A", "topic": "X", "post_timestamp": "2000"}]"#,
        );
        write(&profiles_dir.join("B.json"), r#"{"username": "B"}"#);
        std::fs::create_dir_all(&histories_dir).unwrap();

        let sources = DatasetSources::discover(&profiles_dir, &histories_dir).unwrap();
        let (profiles, histories) = load_sources(&sources).unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(histories[0].len(), 1);
        assert!(histories[1].is_empty());
    }

    #[test]
    fn test_load_sources_length_mismatch() {
        let sources = DatasetSources::new(vec![PathBuf::from("a.json")], vec![]);
        let err = load_sources(&sources).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Integrity(DataIntegrityError::LengthMismatch { .. })
        ));
    }
}
