use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{HistorySource, PathFilter, Revision, RevisionId, sort_chronologically};
use crate::error::HistoryError;

#[derive(Debug, Clone)]
enum FileState {
    Content(Vec<u8>),
    Unreadable(String),
}

#[derive(Debug, Clone)]
struct Snapshot {
    revision: Revision,
    files: BTreeMap<String, FileState>,
    listing_error: Option<String>,
}

/// Synthetic history held entirely in memory.
///
/// Useful for exercising the aggregation pipeline without a repository,
/// including failure modes: files that cannot be read and revisions whose
/// tree cannot be listed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    snapshots: Vec<Snapshot>,
}

impl InMemoryHistory {
    /// Creates an empty history (zero revisions).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a revision whose tree holds exactly `files`.
    #[must_use]
    pub fn with_revision<'a>(
        mut self,
        id: &str,
        timestamp: DateTime<Utc>,
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let files = files
            .into_iter()
            .map(|(path, content)| (path.to_string(), FileState::Content(content.as_bytes().to_vec())))
            .collect();

        self.snapshots.push(Snapshot {
            revision: Revision::new(id, timestamp),
            files,
            listing_error: None,
        });
        self
    }

    /// Marks `path` in revision `id` as tracked but unreadable; fetching it
    /// fails with a tooling error.
    #[must_use]
    pub fn with_unreadable_file(mut self, id: &str, path: &str, message: &str) -> Self {
        if let Some(snapshot) = self.snapshot_mut(id) {
            snapshot
                .files
                .insert(path.to_string(), FileState::Unreadable(message.to_string()));
        }
        self
    }

    /// Makes listing the tree of revision `id` fail with a tooling error.
    #[must_use]
    pub fn with_broken_tree(mut self, id: &str, message: &str) -> Self {
        if let Some(snapshot) = self.snapshot_mut(id) {
            snapshot.listing_error = Some(message.to_string());
        }
        self
    }

    fn snapshot_mut(&mut self, id: &str) -> Option<&mut Snapshot> {
        self.snapshots.iter_mut().find(|s| s.revision.id.as_str() == id)
    }

    fn snapshot(&self, revision: &RevisionId) -> Result<&Snapshot, HistoryError> {
        self.snapshots
            .iter()
            .find(|s| &s.revision.id == revision)
            .ok_or_else(|| HistoryError::RevisionNotFound {
                revision: revision.to_string(),
            })
    }
}

impl HistorySource for InMemoryHistory {
    fn list_revisions(&self) -> Result<Vec<Revision>, HistoryError> {
        let mut revisions: Vec<Revision> = self.snapshots.iter().map(|s| s.revision.clone()).collect();
        sort_chronologically(&mut revisions);
        Ok(revisions)
    }

    fn list_paths(&self, revision: &RevisionId, filter: &PathFilter) -> Result<Vec<String>, HistoryError> {
        let snapshot = self.snapshot(revision)?;

        if let Some(message) = &snapshot.listing_error {
            return Err(HistoryError::tooling(format!("reading tree of {revision}"), message));
        }

        Ok(snapshot.files.keys().filter(|p| filter.matches(p)).cloned().collect())
    }

    fn fetch(&self, revision: &RevisionId, path: &str) -> Result<Vec<u8>, HistoryError> {
        let snapshot = self.snapshot(revision)?;

        match snapshot.files.get(path) {
            Some(FileState::Content(bytes)) => Ok(bytes.clone()),
            Some(FileState::Unreadable(message)) => {
                Err(HistoryError::tooling(format!("reading {path} at {revision}"), message))
            }
            None => Err(HistoryError::PathNotFoundAtRevision {
                revision: revision.to_string(),
                path: path.to_string(),
            }),
        }
    }
}
