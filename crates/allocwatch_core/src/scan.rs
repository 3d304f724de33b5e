//! Per-revision scanning: path listing, content fetch, and counting.

use std::fmt;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::aggregate::{ProgressSink, ScanEvent};
use crate::error::HistoryError;
use crate::history::{HistorySource, PathFilter, Revision, RevisionId};
use crate::pattern::PatternCounter;
use crate::report::{DetailReport, MatchRecord};
use crate::text::decode_source;

/// Resource limits applied to each fetched file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanLimits {
    /// Files larger than this many bytes are skipped.
    pub max_file_size: Option<u64>,
}

/// Counts allocation calls in one revision of a [`HistorySource`].
///
/// A missing file is skipped quietly. A file that cannot be read is reported
/// through the progress sink and contributes zero while the rest of the
/// revision is still counted. Only a failure to list the revision's tree, or
/// an unrecoverable fetch error, fails the scan.
pub struct RevisionScanner<'a, S: ?Sized> {
    source: &'a S,
    filter: &'a PathFilter,
    counter: &'a PatternCounter,
    limits: ScanLimits,
    progress: Option<&'a dyn ProgressSink>,
}

impl<S: ?Sized> fmt::Debug for RevisionScanner<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevisionScanner")
            .field("filter", self.filter)
            .field("counter", self.counter)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl<'a, S: HistorySource + ?Sized> RevisionScanner<'a, S> {
    /// Creates a scanner over `source` restricted to `filter`.
    #[must_use]
    pub const fn new(source: &'a S, filter: &'a PathFilter, counter: &'a PatternCounter) -> Self {
        Self {
            source,
            filter,
            counter,
            limits: ScanLimits { max_file_size: None },
            progress: None,
        }
    }

    /// Applies per-file limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Reports unreadable files to `sink`.
    #[must_use]
    pub const fn with_progress(mut self, sink: Option<&'a dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Returns the total call count across all matching files at `revision`.
    pub fn count(&self, revision: &RevisionId) -> Result<usize, HistoryError> {
        let mut total = 0;
        self.for_each_file(revision, |_, content| {
            total += self.counter.count(content);
        })?;
        Ok(total)
    }

    /// Collects every matching line at `revision`, ordered by path then line.
    pub fn detail(&self, revision: &Revision) -> Result<DetailReport, HistoryError> {
        let mut matches = Vec::new();
        self.for_each_file(&revision.id, |path, content| {
            matches.extend(
                self.counter
                    .find_matches(content)
                    .into_iter()
                    .map(|m| MatchRecord::new(path, m)),
            );
        })?;

        Ok(DetailReport {
            revision: revision.clone(),
            matches,
        })
    }

    fn for_each_file<F>(&self, revision: &RevisionId, mut visit: F) -> Result<(), HistoryError>
    where
        F: FnMut(&str, &str),
    {
        let paths = self.source.list_paths(revision, self.filter)?;

        for path in &paths {
            let bytes = match self.source.fetch(revision, path) {
                Ok(bytes) => bytes,
                Err(error) if !error.is_recoverable() => return Err(error),
                Err(HistoryError::PathNotFoundAtRevision { .. }) => {
                    #[cfg(feature = "tracing")]
                    debug!(%path, revision = %revision.short(), "path absent at revision");
                    continue;
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(%path, revision = %revision.short(), %error, "file unreadable, counted as zero");

                    if let Some(sink) = self.progress {
                        sink.on_event(&ScanEvent::FileUnreadable {
                            revision,
                            path,
                            error: &error,
                        });
                    }
                    continue;
                }
            };

            match decode_source(&bytes, self.limits.max_file_size) {
                Ok(content) => visit(path, &content),
                Err(_reason) => {
                    #[cfg(feature = "tracing")]
                    debug!(%path, reason = %_reason, "skipping file");
                }
            }
        }

        Ok(())
    }
}

/// Counts calls at `revision` in one shot, without progress reporting.
pub fn scan_revision<S: HistorySource + ?Sized>(
    source: &S,
    revision: &RevisionId,
    filter: &PathFilter,
    counter: &PatternCounter,
    limits: ScanLimits,
) -> Result<usize, HistoryError> {
    RevisionScanner::new(source, filter, counter)
        .with_limits(limits)
        .count(revision)
}

/// Lists every matching line at `revision`.
pub fn detail_report<S: HistorySource + ?Sized>(
    source: &S,
    revision: &Revision,
    filter: &PathFilter,
    counter: &PatternCounter,
    limits: ScanLimits,
) -> Result<DetailReport, HistoryError> {
    RevisionScanner::new(source, filter, counter)
        .with_limits(limits)
        .detail(revision)
}
