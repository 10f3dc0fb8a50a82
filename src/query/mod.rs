//! Query Engine
//!
//! Holds merged records in post-time order and answers declarative queries:
//!
//! - **dataset**: `PostDataset`, the immutable sorted collection
//! - **filter**: `PostFilter` and its typed `Clause`s
//! - **render**: text table and CSV views
//! - **error**: Error types
//!
//! # Resolution
//!
//! ```text
//! PostFilter → validate → range clauses (one at a time, each narrowing)
//!                       → equality pass → new PostDataset (re-sorted)
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use discourse_dataset::query::{parse_moment, PostFilter};
//!
//! let games_2021 = dataset.filter(
//!     &PostFilter::new()
//!         .category("Games")
//!         .post_after(parse_moment("2021-01-01")?),
//! )?;
//!
//! let laser = dataset.search(&["laser", "cnc"])?;
//! let categories = dataset.distinct(Field::Category);
//! ```

mod dataset;
mod error;
mod filter;
mod render;

pub use dataset::PostDataset;
pub use error::{QueryError, QueryResult};
pub use filter::{parse_moment, Clause, PostFilter};
