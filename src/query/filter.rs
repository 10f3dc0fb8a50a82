//! Filter predicates
//!
//! A `PostFilter` is an immutable list of typed clauses:
//!
//! ```text
//! Equals(field, value)      field present and equal to value
//! Before(field, threshold)  field present and strictly less than threshold
//! After(field, threshold)   field present and strictly greater than threshold
//! ```
//!
//! Each named predicate (e.g. `post_after`) holds at most one clause;
//! setting it again replaces the earlier value.
//!
//! Resolution is a left fold: every range clause narrows the candidate list
//! in turn, then a single equality pass keeps the candidates matching all
//! equality clauses. Range clauses are independent cutoffs, so the order in
//! which they are folded does not change the result.

use crate::query::error::{QueryError, QueryResult};
use crate::records::{format_timestamp, Field, FieldKind, FieldValue, MergedPost};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A single typed filter clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Field is present and equal to the value
    Equals(Field, FieldValue),
    /// Timestamp field is present and `< threshold` (epoch ms)
    Before(Field, i64),
    /// Timestamp field is present and `> threshold` (epoch ms)
    After(Field, i64),
}

impl Clause {
    /// Field this clause reads
    pub fn field(&self) -> Field {
        match self {
            Clause::Equals(field, _) | Clause::Before(field, _) | Clause::After(field, _) => *field,
        }
    }

    /// True for `Before` / `After` clauses
    pub fn is_range(&self) -> bool {
        matches!(self, Clause::Before(..) | Clause::After(..))
    }

    /// Two clauses occupy the same named predicate slot
    fn same_slot(&self, other: &Clause) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self.field() == other.field()
    }

    /// Check that the clause's value fits its field
    pub fn validate(&self) -> QueryResult<()> {
        match self {
            Clause::Equals(field, value) => {
                if field.kind() != value.kind() {
                    return Err(QueryError::InvalidFilterArgument(format!(
                        "'{}' expects a {} value, got {} '{}'",
                        field,
                        field.kind(),
                        value.kind(),
                        value
                    )));
                }
            }
            Clause::Before(field, _) | Clause::After(field, _) => {
                if field.kind() != FieldKind::Timestamp {
                    return Err(QueryError::InvalidFilterArgument(format!(
                        "range predicate on non-timestamp field '{}'",
                        field
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check a record against this clause; a missing field never matches
    pub fn matches(&self, post: &MergedPost) -> bool {
        match self {
            Clause::Equals(field, value) => post.field_equals(*field, value),
            Clause::Before(field, threshold) => {
                post.timestamp(*field).is_some_and(|ts| ts < *threshold)
            }
            Clause::After(field, threshold) => {
                post.timestamp(*field).is_some_and(|ts| ts > *threshold)
            }
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clause::Equals(field, value) => write!(f, "{} = {}", field, value),
            Clause::Before(field, ts) => write!(f, "{} < {}", field, format_timestamp(*ts)),
            Clause::After(field, ts) => write!(f, "{} > {}", field, format_timestamp(*ts)),
        }
    }
}

/// Named range predicates and the timestamp field each one cuts on
const RANGE_PREDICATES: &[(&str, Field, bool)] = &[
    ("join_before", Field::JoinTimestamp, true),
    ("join_after", Field::JoinTimestamp, false),
    ("last_post_before", Field::LastPostTimestamp, true),
    ("last_post_after", Field::LastPostTimestamp, false),
    ("post_before", Field::PostTimestamp, true),
    ("post_after", Field::PostTimestamp, false),
];

/// Named equality predicates accepted by [`PostFilter::set`]
const EQUALITY_PREDICATES: &[Field] = &[
    Field::Username,
    Field::FullName,
    Field::MemberStatus,
    Field::Topic,
    Field::TopicLink,
    Field::Text,
    Field::Category,
    Field::Empty,
];

/// Declarative, multi-predicate filter over merged records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    clauses: Vec<Clause>,
}

impl PostFilter {
    /// Create an empty filter (matches every record)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause, replacing any earlier clause for the same predicate
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.retain(|existing| !existing.same_slot(&clause));
        self.clauses.push(clause);
        self
    }

    /// Equality predicate on any field
    pub fn equals(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.clause(Clause::Equals(field, value.into()))
    }

    /// Strict upper bound on a timestamp field
    pub fn before(self, field: Field, moment: DateTime<Utc>) -> Self {
        self.clause(Clause::Before(field, moment.timestamp_millis()))
    }

    /// Strict lower bound on a timestamp field
    pub fn after(self, field: Field, moment: DateTime<Utc>) -> Self {
        self.clause(Clause::After(field, moment.timestamp_millis()))
    }

    pub fn username(self, value: impl Into<String>) -> Self {
        self.equals(Field::Username, FieldValue::Text(value.into()))
    }

    pub fn full_name(self, value: impl Into<String>) -> Self {
        self.equals(Field::FullName, FieldValue::Text(value.into()))
    }

    pub fn member_status(self, value: impl Into<String>) -> Self {
        self.equals(Field::MemberStatus, FieldValue::Text(value.into()))
    }

    pub fn topic(self, value: impl Into<String>) -> Self {
        self.equals(Field::Topic, FieldValue::Text(value.into()))
    }

    pub fn topic_link(self, value: impl Into<String>) -> Self {
        self.equals(Field::TopicLink, FieldValue::Text(value.into()))
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.equals(Field::Text, FieldValue::Text(value.into()))
    }

    pub fn category(self, value: impl Into<String>) -> Self {
        self.equals(Field::Category, FieldValue::Text(value.into()))
    }

    /// Match placeholder (`true`) or real post (`false`) records
    pub fn empty(self, value: bool) -> Self {
        self.equals(Field::Empty, FieldValue::Flag(value))
    }

    pub fn join_before(self, moment: DateTime<Utc>) -> Self {
        self.before(Field::JoinTimestamp, moment)
    }

    pub fn join_after(self, moment: DateTime<Utc>) -> Self {
        self.after(Field::JoinTimestamp, moment)
    }

    pub fn last_post_before(self, moment: DateTime<Utc>) -> Self {
        self.before(Field::LastPostTimestamp, moment)
    }

    pub fn last_post_after(self, moment: DateTime<Utc>) -> Self {
        self.after(Field::LastPostTimestamp, moment)
    }

    pub fn post_before(self, moment: DateTime<Utc>) -> Self {
        self.before(Field::PostTimestamp, moment)
    }

    pub fn post_after(self, moment: DateTime<Utc>) -> Self {
        self.after(Field::PostTimestamp, moment)
    }

    /// Set a named predicate from text, as supplied on a command line
    ///
    /// Range predicates take a calendar date or date-time (see
    /// [`parse_moment`]); `empty` takes `true` or `false`; the other
    /// equality predicates take the value verbatim.
    pub fn set(self, key: &str, value: &str) -> QueryResult<Self> {
        if let Some((_, field, is_before)) = RANGE_PREDICATES.iter().find(|(name, ..)| *name == key) {
            let moment = parse_moment(value)?;
            return Ok(if *is_before {
                self.before(*field, moment)
            } else {
                self.after(*field, moment)
            });
        }

        let field = EQUALITY_PREDICATES
            .iter()
            .copied()
            .find(|f| f.name() == key)
            .ok_or_else(|| QueryError::InvalidFilterArgument(format!("unknown predicate '{}'", key)))?;

        let value = match field.kind() {
            FieldKind::Flag => FieldValue::Flag(parse_flag(key, value)?),
            _ => FieldValue::Text(value.to_string()),
        };
        Ok(self.equals(field, value))
    }

    /// The clauses in insertion order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Validate every clause
    pub fn validate(&self) -> QueryResult<()> {
        self.clauses.iter().try_for_each(Clause::validate)
    }

    /// Resolve this filter against a candidate list
    ///
    /// Returns the matching records, cloned, in input order.
    pub fn apply(&self, posts: &[MergedPost]) -> QueryResult<Vec<MergedPost>> {
        self.validate()?;

        let (ranges, equalities): (Vec<&Clause>, Vec<&Clause>) =
            self.clauses.iter().partition(|c| c.is_range());

        let narrowed = ranges
            .iter()
            .fold(posts.iter().collect::<Vec<_>>(), |candidates, clause| {
                let kept: Vec<&MergedPost> =
                    candidates.into_iter().filter(|p| clause.matches(p)).collect();
                tracing::trace!(clause = %clause, remaining = kept.len(), "Applied range clause");
                kept
            });

        Ok(narrowed
            .into_iter()
            .filter(|post| equalities.iter().all(|c| c.matches(post)))
            .cloned()
            .collect())
    }
}

impl std::fmt::Display for PostFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "*");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Parse a calendar date or date-time (UTC) for a range predicate
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and a bare
/// `YYYY-MM-DD`, which means midnight UTC.
pub fn parse_moment(s: &str) -> QueryResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(QueryError::InvalidFilterArgument(format!(
        "expected a date or date-time, got '{}'",
        s
    )))
}

fn parse_flag(key: &str, value: &str) -> QueryResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(QueryError::InvalidFilterArgument(format!(
            "'{}' expects true or false, got '{}'",
            key, value
        ))),
    }
}
