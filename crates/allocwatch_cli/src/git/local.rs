//! Thread-local git history access.

use std::cell::RefCell;
use std::collections::HashMap;

use allocwatch_core::history::sort_chronologically;
use allocwatch_core::prelude::*;
use gix::bstr::ByteSlice as _;
use gix::objs::tree::EntryKind;

use super::types::{WalkOptions, object_id, revision_from_commit};

const UNBORN_CANDIDATE: &str = "HEAD";

/// Non-`Send` history source backed by a single `gix` repository handle.
///
/// Every query reads the object database. The working tree and index are
/// never consulted, so scanning is safe while the checkout is dirty.
///
/// The blob ids seen by the last [`HistorySource::list_paths`] call are kept,
/// so fetching a listed path reads the blob directly. This also covers paths
/// whose names are not valid UTF-8 and only survive listing in lossy form.
#[derive(Debug)]
pub struct GitHistory {
    pub(super) inner: gix::Repository,
    pub(super) walk: WalkOptions,
    pub(super) listing: RefCell<Listing>,
}

/// Blob ids of the most recently listed revision, keyed by listed path.
#[derive(Debug, Default)]
pub(super) struct Listing {
    revision: Option<RevisionId>,
    blobs: HashMap<String, gix::ObjectId>,
}

impl Listing {
    fn replace(&mut self, revision: &RevisionId, blobs: HashMap<String, gix::ObjectId>) {
        self.revision = Some(revision.clone());
        self.blobs = blobs;
    }

    fn blob(&self, revision: &RevisionId, path: &str) -> Option<gix::ObjectId> {
        if self.revision.as_ref() == Some(revision) {
            self.blobs.get(path).copied()
        } else {
            None
        }
    }
}

impl GitHistory {
    /// Resolves the configured reference to the commit it names.
    ///
    /// Returns `None` for a repository whose `HEAD` is unborn.
    pub fn resolve_start(&self) -> Result<Option<Revision>, HistoryError> {
        let Some(tip) = self.resolve_tip()? else {
            return Ok(None);
        };

        let commit = self
            .inner
            .find_commit(tip)
            .map_err(|e| HistoryError::tooling(format!("reading commit {tip}"), e))?;

        revision_from_commit(&commit).map(Some)
    }

    fn resolve_tip(&self) -> Result<Option<gix::ObjectId>, HistoryError> {
        let reference = self.walk.reference.as_str();
        let spec = format!("{reference}^{{commit}}");

        match self.inner.rev_parse_single(spec.as_str()) {
            Ok(id) => Ok(Some(id.detach())),
            Err(_) if reference == UNBORN_CANDIDATE && self.is_unborn() => Ok(None),
            Err(_) => Err(HistoryError::HistoryUnavailable {
                reference: reference.to_string(),
            }),
        }
    }

    fn is_unborn(&self) -> bool {
        self.inner.head().is_ok_and(|head| head.is_unborn())
    }

    fn tree_at(&self, revision: &RevisionId) -> Result<gix::Tree<'_>, HistoryError> {
        let oid = object_id(revision)?;

        let commit = self
            .inner
            .find_commit(oid)
            .map_err(|_err| HistoryError::RevisionNotFound {
                revision: revision.to_string(),
            })?;

        commit
            .tree()
            .map_err(|e| HistoryError::tooling(format!("reading tree of {}", revision.short()), e))
    }

    fn subtree<'r>(&'r self, tree: &gix::Tree<'r>, dir: &str) -> Result<Option<gix::Tree<'r>>, HistoryError> {
        let entry = tree
            .lookup_entry_by_path(dir)
            .map_err(|e| HistoryError::tooling(format!("looking up '{dir}'"), e))?;

        let Some(entry) = entry.filter(|e| e.mode().is_tree()) else {
            return Ok(None);
        };

        self.inner
            .find_tree(entry.object_id())
            .map(Some)
            .map_err(|e| HistoryError::tooling(format!("reading tree '{dir}'"), e))
    }

    fn lookup_blob(&self, revision: &RevisionId, path: &str) -> Result<gix::ObjectId, HistoryError> {
        let tree = self.tree_at(revision)?;

        let entry = tree
            .lookup_entry_by_path(path)
            .map_err(|e| HistoryError::tooling(format!("looking up '{path}'"), e))?
            .ok_or_else(|| HistoryError::PathNotFoundAtRevision {
                revision: revision.to_string(),
                path: path.to_string(),
            })?;

        Ok(entry.object_id())
    }
}

fn collect_blobs(
    tree: &gix::Tree<'_>,
    prefix: &str,
    filter: &PathFilter,
    out: &mut HashMap<String, gix::ObjectId>,
) -> Result<(), HistoryError> {
    let mut recorder = gix::traverse::tree::Recorder::default();
    tree.traverse()
        .breadthfirst(&mut recorder)
        .map_err(|e| HistoryError::tooling("walking tree", e))?;

    for entry in recorder.records {
        if !matches!(entry.mode.kind(), EntryKind::Blob | EntryKind::BlobExecutable) {
            continue;
        }

        let path = join_path(prefix, &entry.filepath.to_str_lossy());
        if !filter.matches(&path) {
            continue;
        }

        // Distinct non-UTF-8 names can decode to the same lossy path.
        if let Some(_previous) = out.insert(path, entry.oid) {
            #[cfg(feature = "tracing")]
            tracing::warn!(blob = %_previous, "two tracked paths share a lossy name, keeping the last");
        }
    }

    Ok(())
}

fn join_path(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{prefix}/{relative}")
    }
}

impl HistorySource for GitHistory {
    #[expect(
        clippy::default_trait_access,
        reason = "CommitTimeOrder is a private type in gix; cannot name it explicitly"
    )]
    fn list_revisions(&self) -> Result<Vec<Revision>, HistoryError> {
        let Some(tip) = self.resolve_tip()? else {
            return Ok(Vec::new());
        };

        let mut walk = self
            .inner
            .rev_walk([tip])
            .sorting(gix::revision::walk::Sorting::ByCommitTime(Default::default()));

        if self.walk.first_parent {
            walk = walk.first_parent_only();
        }

        let limit = self.walk.limit.unwrap_or(usize::MAX);
        let mut revisions = Vec::with_capacity(limit.min(1024));

        let walk = walk
            .all()
            .map_err(|e| HistoryError::tooling("starting revision walk", e))?;

        for info in walk {
            if revisions.len() >= limit {
                break;
            }

            let info = info.map_err(|e| HistoryError::tooling("walking history", e))?;
            let commit = self
                .inner
                .find_commit(info.id)
                .map_err(|e| HistoryError::tooling(format!("reading commit {}", info.id), e))?;

            revisions.push(revision_from_commit(&commit)?);
        }

        // Newest first from the walk; flip, then settle clock skew.
        revisions.reverse();
        sort_chronologically(&mut revisions);

        Ok(revisions)
    }

    fn list_paths(&self, revision: &RevisionId, filter: &PathFilter) -> Result<Vec<String>, HistoryError> {
        let tree = self.tree_at(revision)?;
        let mut blobs = HashMap::new();

        if filter.directories().is_empty() {
            collect_blobs(&tree, "", filter, &mut blobs)?;
        } else {
            for dir in filter.directories() {
                if let Some(subtree) = self.subtree(&tree, dir)? {
                    collect_blobs(&subtree, dir, filter, &mut blobs)?;
                }
            }
        }

        let mut paths: Vec<String> = blobs.keys().cloned().collect();
        paths.sort_unstable();

        self.listing.borrow_mut().replace(revision, blobs);
        Ok(paths)
    }

    fn fetch(&self, revision: &RevisionId, path: &str) -> Result<Vec<u8>, HistoryError> {
        let listed = self.listing.borrow().blob(revision, path);
        let oid = match listed {
            Some(oid) => oid,
            None => self.lookup_blob(revision, path)?,
        };

        let mut blob = self
            .inner
            .find_blob(oid)
            .map_err(|e| HistoryError::tooling(format!("reading '{path}' at {}", revision.short()), e))?;

        Ok(std::mem::take(&mut blob.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(hex: &str) -> gix::ObjectId {
        gix::ObjectId::from_hex(hex.as_bytes()).unwrap()
    }

    #[test]
    fn listing_serves_only_its_own_revision() {
        let blob = oid("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        let mut listing = Listing::default();
        listing.replace(&RevisionId::new("r1"), HashMap::from([("src/caf\u{fffd}.c".to_string(), blob)]));

        assert_eq!(listing.blob(&RevisionId::new("r1"), "src/caf\u{fffd}.c"), Some(blob));
        assert_eq!(listing.blob(&RevisionId::new("r2"), "src/caf\u{fffd}.c"), None);
        assert_eq!(listing.blob(&RevisionId::new("r1"), "src/other.c"), None);
    }

    #[test]
    fn join_path_handles_root_prefix() {
        assert_eq!(join_path("", "main.c"), "main.c");
        assert_eq!(join_path("src/core", "alloc.c"), "src/core/alloc.c");
    }
}
