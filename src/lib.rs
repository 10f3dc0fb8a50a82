//! # Discourse Dataset
//!
//! Core of a forum-activity dataset: member profiles and per-member post
//! histories harvested from a Discourse forum are merged into one flat list
//! of posts, then held in post-time order behind a small query engine.
//!
//! ## Modules
//!
//! - [`records`]: Profile, post and merged-post records
//! - [`merge`]: Profile/history alignment and merging
//! - [`query`]: `PostDataset` with filtering, search and projection
//! - [`store`]: Source file loading and the merged-list artifact
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use discourse_dataset::query::{parse_moment, PostFilter};
//! use discourse_dataset::records::Field;
//! use discourse_dataset::store::{DatasetSources, MergedStore};
//! use discourse_dataset::PostDataset;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Path::new("datasets/Discourse");
//!     let sources = DatasetSources::discover(
//!         &root.join("json_files/profiles"),
//!         &root.join("json_files/post_histories"),
//!     )?;
//!     let store = MergedStore::open(root.join("posts.json"));
//!
//!     let dataset = PostDataset::from_sources(&sources, &store, false)?;
//!
//!     let recent_games = dataset.filter(
//!         &PostFilter::new()
//!             .category("Games")
//!             .post_after(parse_moment("2021-01-01")?),
//!     )?;
//!     print!("{}", recent_games);
//!
//!     println!("{} members", dataset.distinct(Field::Username).len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod merge;
pub mod query;
pub mod records;
pub mod store;

// Re-export top-level types for convenience
pub use records::{Field, FieldKind, FieldValue, MergedPost, PostEntry, Profile, RecordError};

pub use merge::{merge_records, DataIntegrityError};

pub use query::{parse_moment, Clause, PostDataset, PostFilter, QueryError, QueryResult};

pub use store::{DatasetSources, MergedStore, StoreError, StoreResult};

pub use config::{Config, ConfigError, DatasetConfig, LoggingConfig};
