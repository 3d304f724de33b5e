//! Revision history abstraction.
//!
//! A [`HistorySource`] enumerates revisions, lists tracked paths, and reads
//! historical file content. The CLI backs it with git; [`InMemoryHistory`]
//! provides synthetic histories for tests and embedding.

mod filter;
mod memory;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use self::filter::PathFilter;
pub use self::memory::InMemoryHistory;
use crate::error::HistoryError;

const SHORT_ID_LENGTH: usize = 7;

/// Stable, content-derived identifier of a revision (e.g. a full commit hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(Arc<str>);

impl RevisionId {
    /// Wraps an identifier string.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the full identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the abbreviated identifier used for display.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..SHORT_ID_LENGTH).unwrap_or(&self.0)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One snapshot of the tracked tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Identifier of the snapshot.
    pub id: RevisionId,
    /// Recorded commit time.
    pub timestamp: DateTime<Utc>,
}

impl Revision {
    /// Creates a revision from an identifier and timestamp.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: RevisionId::new(id),
            timestamp,
        }
    }
}

/// Stable-sorts revisions oldest first, keeping the incoming order for equal
/// timestamps.
pub fn sort_chronologically(revisions: &mut [Revision]) {
    revisions.sort_by_key(|r| r.timestamp);
}

/// Read-only provider of revision history and historical content.
///
/// Implementations must not mutate any working tree or index: every call is
/// a pure query against recorded history.
pub trait HistorySource {
    /// Lists every revision reachable from the configured reference point,
    /// oldest first.
    ///
    /// An empty repository yields an empty list rather than an error.
    fn list_revisions(&self) -> Result<Vec<Revision>, HistoryError>;

    /// Lists tracked file paths at `revision` accepted by `filter`, sorted
    /// and without duplicates.
    fn list_paths(&self, revision: &RevisionId, filter: &PathFilter) -> Result<Vec<String>, HistoryError>;

    /// Reads the content recorded for `path` at `revision`.
    fn fetch(&self, revision: &RevisionId, path: &str) -> Result<Vec<u8>, HistoryError>;
}

impl<T: HistorySource + ?Sized> HistorySource for &T {
    fn list_revisions(&self) -> Result<Vec<Revision>, HistoryError> {
        (**self).list_revisions()
    }

    fn list_paths(&self, revision: &RevisionId, filter: &PathFilter) -> Result<Vec<String>, HistoryError> {
        (**self).list_paths(revision, filter)
    }

    fn fetch(&self, revision: &RevisionId, path: &str) -> Result<Vec<u8>, HistoryError> {
        (**self).fetch(revision, path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn short_id_truncates_long_hashes() {
        let id = RevisionId::new("0123456789abcdef");
        assert_eq!(id.short(), "0123456");
        assert_eq!(id.as_str(), "0123456789abcdef");
    }

    #[test]
    fn short_id_keeps_short_identifiers() {
        assert_eq!(RevisionId::new("r1").short(), "r1");
    }

    #[test]
    fn sort_chronologically_orders_by_timestamp() {
        let mut revs = vec![Revision::new("c", at(30)), Revision::new("a", at(10)), Revision::new("b", at(20))];
        sort_chronologically(&mut revs);
        let ids: Vec<_> = revs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn sort_chronologically_keeps_order_for_ties() {
        let mut revs = vec![Revision::new("first", at(5)), Revision::new("second", at(5)), Revision::new("early", at(1))];
        sort_chronologically(&mut revs);
        let ids: Vec<_> = revs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["early", "first", "second"]);
    }
}
