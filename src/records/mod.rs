//! Record Model
//!
//! Data shapes shared by the merger, the query engine and the loaders:
//!
//! - **types**: `Profile`, `PostEntry`, `MergedPost` and the `Field` vocabulary
//! - **normalize**: load-time coercion of `*_timestamp` fields
//! - **render**: human-readable views of merged records
//! - **error**: Error types

pub mod error;
pub mod normalize;
pub mod render;
pub mod types;

pub use error::{RecordError, RecordResult};
pub use normalize::{decode_record, decode_records, normalize_timestamps};
pub use render::{format_timestamp, RenderedPost};
pub use types::{Field, FieldKind, FieldValue, MergedPost, PostEntry, Profile};
