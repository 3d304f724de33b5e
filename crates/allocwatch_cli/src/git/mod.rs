//! Git-backed history source.

mod local;
mod types;

use std::cell::RefCell;
use std::path::Path;

use allocwatch_core::HistoryError;
use gix::ThreadSafeRepository;

pub use self::local::GitHistory;
pub use self::types::WalkOptions;

/// Default object cache size for tree lookups (64 MB).
const DEFAULT_CACHE_SIZE: usize = 64 * 1024 * 1024;

/// Thread-safe handle to a discovered git repository.
#[derive(Debug)]
pub struct Repo {
    /// The underlying `gix` thread-safe repository.
    inner: ThreadSafeRepository,
    /// Object cache size computed from the repository index.
    cache_size: usize,
}

impl Repo {
    /// Discovers and opens a git repository at or above the given path.
    pub fn discover(path: &Path) -> Result<Self, HistoryError> {
        let mut repo = gix::discover(path)
            .map_err(|e| HistoryError::tooling(format!("opening repository at {}", path.display()), e))?;
        let cache_size = compute_cache_size(&repo);
        configure_cache(&mut repo, cache_size);
        let inner = repo.into_sync();
        Ok(Self { inner, cache_size })
    }

    /// Opens the repository containing the current working directory.
    pub fn open_cwd() -> Result<Self, HistoryError> {
        let cwd = std::env::current_dir().map_err(|e| HistoryError::tooling("reading current directory", e))?;
        Self::discover(&cwd)
    }

    /// Creates a thread-local history source for use within a rayon task.
    #[must_use]
    pub fn history(&self, walk: &WalkOptions) -> GitHistory {
        let mut repo = self.inner.to_thread_local();
        configure_cache(&mut repo, self.cache_size);
        GitHistory {
            inner: repo,
            walk: walk.clone(),
            listing: RefCell::default(),
        }
    }

    /// Returns `true` if this is a shallow clone with truncated history.
    #[must_use]
    pub fn is_shallow(&self) -> bool {
        self.inner.to_thread_local().is_shallow()
    }
}

fn compute_cache_size(repo: &gix::Repository) -> usize {
    repo.index_or_empty()
        .map(|idx| repo.compute_object_cache_size_for_tree_diffs(&idx))
        .unwrap_or(DEFAULT_CACHE_SIZE)
}

fn configure_cache(repo: &mut gix::Repository, size: usize) {
    repo.object_cache_size_if_unset(size);
}
