//! Dataset Store
//!
//! Boundary with the harvesting pipeline: reads the per-user JSON files the
//! converter produced and keeps the merged flat list on disk.
//!
//! - **sources**: source discovery and loading
//! - **cache**: the persisted merged artifact and the `overwrite` policy
//! - **error**: Error types
//!
//! # Pipeline
//!
//! ```text
//! profiles/*.json ─┐
//!                  ├→ normalize → merge → posts.json → PostDataset
//! post_histories/ ─┘
//! ```

pub mod cache;
pub mod error;
pub mod sources;

pub use cache::MergedStore;
pub use error::{StoreError, StoreResult};
pub use sources::{load_post_history, load_profile, load_sources, DatasetSources};
