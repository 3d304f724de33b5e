//! Conversions between git objects and core history types.

use allocwatch_core::prelude::*;
use chrono::{DateTime, Utc};

/// Options controlling which commits the history walk visits.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Commit-ish the walk starts from.
    pub reference: String,
    /// Follow only the first parent of merge commits.
    pub first_parent: bool,
    /// Keep only the N most recent commits.
    pub limit: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            reference: "HEAD".to_string(),
            first_parent: false,
            limit: None,
        }
    }
}

/// Parses a revision identifier back into a git object ID.
pub(super) fn object_id(revision: &RevisionId) -> Result<gix::ObjectId, HistoryError> {
    gix::ObjectId::from_hex(revision.as_str().as_bytes()).map_err(|_err| HistoryError::RevisionNotFound {
        revision: revision.to_string(),
    })
}

/// Builds a core revision from a commit, using its committer time.
pub(super) fn revision_from_commit(commit: &gix::Commit<'_>) -> Result<Revision, HistoryError> {
    let seconds = commit
        .time()
        .map_err(|e| HistoryError::tooling(format!("reading time of commit {}", commit.id()), e))?
        .seconds;

    let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default();
    Ok(Revision::new(commit.id().to_string(), timestamp))
}
