//! Core engine for allocwatch.
//!
//! Counts calls to dynamic-memory-allocation functions across the history
//! of a source tree and aggregates them into a per-revision time series.
//! Version control is abstracted behind [`HistorySource`], so the engine can
//! run against git (see the `allocwatch_cli` crate) or a synthetic
//! [`InMemoryHistory`].
//!
//! # Main Types
//!
//! - [`PatternCounter`] - Two-stage counter: coarse keyword filter, then
//!   token-exact matching
//! - [`HistorySource`] - Read-only revision enumeration, path listing, and
//!   content fetch
//! - [`RevisionScanner`] - Counts or lists calls in one revision
//! - [`Aggregator`] - Builds a [`TimeSeries`] with progress and cancellation
//! - [`DetailReport`] / [`SeriesReport`] - Shapes handed to renderers
//! - [`Config`] - User configuration loaded from `.allocwatch.toml`
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for typed errors:
//!
//! - [`HistoryError`] - History backend failures, classified as fatal or
//!   recoverable
//! - [`PatternError`] - Invalid function families
//! - [`ConfigError`] - Configuration loading/parsing failures
//!
//! The CLI crate uses `anyhow` for error propagation.

/// Series aggregation, progress events, and cancellation.
pub mod aggregate;
/// User configuration loaded from `.allocwatch.toml`.
pub mod config;
/// Error types for patterns, configuration, and history access.
pub mod error;
/// Revision history abstraction and path filtering.
pub mod history;
/// The allocation pattern family and two-stage counter.
pub mod pattern;
/// Common re-exports.
pub mod prelude;
/// Report shapes for detail and series output.
pub mod report;
/// Per-revision scanning.
pub mod scan;
/// Count samples, time series, and statistics.
pub mod series;
/// Source decoding and line boundary helpers.
pub mod text;

pub use aggregate::{Aggregator, CancelToken, ProgressSink, ScanEvent, SeriesOutcome, build_series};
pub use config::{Config, ConfigError};
pub use error::{HistoryError, PatternError};
pub use history::{HistorySource, InMemoryHistory, PathFilter, Revision, RevisionId};
pub use pattern::{CoarseFilter, ExactMatcher, LineMatch, PatternCounter};
pub use report::{DetailReport, MatchRecord, SeriesReport};
pub use scan::{RevisionScanner, ScanLimits, detail_report, scan_revision};
pub use series::{CountSample, SeriesStats, TimeSeries};

/// Default filename for allocwatch configuration.
pub const CONFIG_FILENAME: &str = ".allocwatch.toml";
