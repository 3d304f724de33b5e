//! Convenience re-exports of the most commonly used types.

pub use crate::aggregate::{Aggregator, CancelToken, ProgressSink, ScanEvent, SeriesOutcome};
pub use crate::config::{Config, ConfigError};
pub use crate::error::{HistoryError, PatternError};
pub use crate::history::{HistorySource, InMemoryHistory, PathFilter, Revision, RevisionId};
pub use crate::pattern::{LineMatch, PatternCounter};
pub use crate::report::{DetailReport, MatchRecord, SeriesReport};
pub use crate::scan::{RevisionScanner, ScanLimits, detail_report, scan_revision};
pub use crate::series::{CountSample, SeriesStats, TimeSeries};
