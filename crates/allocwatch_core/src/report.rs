//! Report shapes handed to renderers.
//!
//! Nothing here formats output; the CLI turns these into text, JSON, or CSV.

use crate::aggregate::SeriesOutcome;
use crate::history::Revision;
use crate::pattern::LineMatch;
use crate::series::{CountSample, SeriesStats};

/// A line containing allocation calls at the current revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Repository-relative file path.
    pub path: String,
    /// One-based line number.
    pub line: usize,
    /// Line text without the line terminator.
    pub text: String,
    /// Number of calls on the line.
    pub calls: usize,
}

impl MatchRecord {
    /// Attaches a file path to a line match.
    #[must_use]
    pub fn new(path: &str, m: LineMatch) -> Self {
        Self {
            path: path.to_string(),
            line: m.line,
            text: m.text,
            calls: m.calls,
        }
    }
}

/// Matches found at a single revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailReport {
    /// The scanned revision.
    pub revision: Revision,
    /// Matching lines, ordered by path then line number.
    pub matches: Vec<MatchRecord>,
}

impl DetailReport {
    /// Returns `true` if no calls were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Total calls across all matching lines.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.matches.iter().map(|m| m.calls).sum()
    }

    /// Number of distinct files with at least one call.
    #[must_use]
    pub fn file_count(&self) -> usize {
        let mut count = 0;
        let mut previous: Option<&str> = None;
        for m in &self.matches {
            if previous != Some(m.path.as_str()) {
                count += 1;
                previous = Some(m.path.as_str());
            }
        }
        count
    }
}

/// A completed (or explicitly cancelled) series with its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    /// Samples oldest first.
    pub samples: Vec<CountSample>,
    /// Aggregates over `samples`; `None` when there are none.
    pub stats: Option<SeriesStats>,
    /// Number of samples degraded to zero by scan failures.
    pub degraded: usize,
    /// Whether the run was cancelled, leaving `samples` as a prefix.
    pub cancelled: bool,
    /// Number of revisions enumerated, including any not reached.
    pub revisions: usize,
}

impl From<SeriesOutcome> for SeriesReport {
    fn from(outcome: SeriesOutcome) -> Self {
        let stats = outcome.series.stats();
        let degraded = outcome.series.degraded_count();

        Self {
            samples: outcome.series.into_samples(),
            stats,
            degraded,
            cancelled: outcome.cancelled,
            revisions: outcome.revisions,
        }
    }
}

impl SeriesReport {
    /// Returns `true` if there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
