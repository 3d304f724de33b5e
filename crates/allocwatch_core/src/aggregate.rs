//! Aggregation of per-revision counts into a time series.
//!
//! Every enumerated revision produces exactly one sample. A scan failure
//! degrades that sample to zero and is reported through the progress sink
//! and the log; it never aborts the series. Cancellation is checked before
//! each revision and leaves a valid prefix.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::{trace, warn};

use crate::error::HistoryError;
use crate::history::{Revision, RevisionId};
use crate::series::{CountSample, TimeSeries};

/// Progress notifications emitted while a series is built.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// Scanning is about to start.
    Started {
        /// Number of revisions that will be scanned.
        total: usize,
    },
    /// A revision was counted successfully.
    RevisionScanned {
        /// Position of the revision in enumeration order.
        index: usize,
        /// The revision.
        revision: &'a Revision,
        /// Its count.
        count: usize,
    },
    /// A revision could not be scanned and was recorded as zero.
    RevisionDegraded {
        /// Position of the revision in enumeration order.
        index: usize,
        /// The revision.
        revision: &'a Revision,
        /// What went wrong.
        error: &'a HistoryError,
    },
    /// A tracked file could not be read and contributed zero.
    FileUnreadable {
        /// Revision being scanned.
        revision: &'a RevisionId,
        /// The file that failed.
        path: &'a str,
        /// What went wrong.
        error: &'a HistoryError,
    },
    /// Scanning has stopped.
    Finished {
        /// Number of samples produced.
        scanned: usize,
        /// Whether the run was cancelled before the last revision.
        cancelled: bool,
    },
}

/// Receiver for [`ScanEvent`]s.
///
/// Sinks are called from rayon workers during parallel scans, so they must
/// be `Sync`.
pub trait ProgressSink: Sync {
    /// Handles one event.
    fn on_event(&self, event: &ScanEvent<'_>);
}

/// Shared flag used to stop a run between revisions.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Revisions already being scanned finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of building a series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    /// Samples in enumeration order. When cancelled, this is the prefix that
    /// completed before cancellation.
    pub series: TimeSeries,
    /// Whether the run stopped before every revision was sampled.
    pub cancelled: bool,
    /// Number of revisions that were enumerated.
    pub revisions: usize,
}

impl SeriesOutcome {
    /// Returns `true` if every enumerated revision has a sample.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.series.len() == self.revisions
    }
}

/// Builds time series from per-revision scanners.
#[derive(Default)]
pub struct Aggregator<'a> {
    progress: Option<&'a dyn ProgressSink>,
    cancel: CancelToken,
}

impl fmt::Debug for Aggregator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator with no progress sink and a fresh cancel token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends progress events to `sink`.
    #[must_use]
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Stops scanning once `token` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Scans revisions one at a time, in enumeration order.
    pub fn build_series<F>(&self, revisions: &[Revision], scanner: F) -> SeriesOutcome
    where
        F: Fn(&Revision) -> Result<usize, HistoryError>,
    {
        self.emit(&ScanEvent::Started { total: revisions.len() });

        let mut series = TimeSeries::new();
        let mut cancelled = false;

        for (index, revision) in revisions.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let result = scanner(revision);
            self.report(index, revision, &result);
            series.push(into_sample(revision, result));
        }

        self.finish(series, cancelled, revisions.len())
    }

    /// Scans revisions on the rayon pool and reassembles the samples in
    /// enumeration order.
    ///
    /// `init` creates per-worker state (such as a thread-local repository
    /// handle) that is passed to every `scanner` call on that worker.
    pub fn build_series_parallel<L, I, F>(&self, revisions: &[Revision], init: I, scanner: F) -> SeriesOutcome
    where
        I: Fn() -> L + Sync + Send,
        F: Fn(&mut L, &Revision) -> Result<usize, HistoryError> + Sync + Send,
    {
        self.emit(&ScanEvent::Started { total: revisions.len() });

        let results: Vec<Option<Result<usize, HistoryError>>> = revisions
            .par_iter()
            .enumerate()
            .map_init(init, |local, (index, revision)| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let result = scanner(local, revision);
                self.report(index, revision, &result);
                Some(result)
            })
            .collect();

        let mut series = TimeSeries::new();
        let mut cancelled = false;

        for (revision, result) in revisions.iter().zip(results) {
            let Some(result) = result else {
                cancelled = true;
                break;
            };
            series.push(into_sample(revision, result));
        }

        self.finish(series, cancelled, revisions.len())
    }

    fn report(&self, index: usize, revision: &Revision, result: &Result<usize, HistoryError>) {
        match result {
            Ok(count) => {
                #[cfg(feature = "tracing")]
                trace!(revision = %revision.id.short(), count, "revision scanned");

                self.emit(&ScanEvent::RevisionScanned {
                    index,
                    revision,
                    count: *count,
                });
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                warn!(revision = %revision.id.short(), %error, "revision degraded to zero");

                self.emit(&ScanEvent::RevisionDegraded { index, revision, error });
            }
        }
    }

    fn finish(&self, series: TimeSeries, cancelled: bool, revisions: usize) -> SeriesOutcome {
        self.emit(&ScanEvent::Finished {
            scanned: series.len(),
            cancelled,
        });

        SeriesOutcome {
            series,
            cancelled,
            revisions,
        }
    }

    fn emit(&self, event: &ScanEvent<'_>) {
        if let Some(sink) = self.progress {
            sink.on_event(event);
        }
    }
}

fn into_sample(revision: &Revision, result: Result<usize, HistoryError>) -> CountSample {
    match result {
        Ok(count) => CountSample::scanned(revision.clone(), count),
        Err(error) => CountSample::degraded(revision.clone(), error.to_string()),
    }
}

/// Builds a complete series sequentially with no progress reporting or
/// cancellation.
pub fn build_series<F>(revisions: &[Revision], scanner: F) -> TimeSeries
where
    F: Fn(&Revision) -> Result<usize, HistoryError>,
{
    Aggregator::new().build_series(revisions, scanner).series
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn revisions(n: usize) -> Vec<Revision> {
        (0..n)
            .map(|i| Revision::new(format!("rev{i}"), Utc.timestamp_opt(i as i64 * 60, 0).unwrap()))
            .collect()
    }

    fn index_of(revision: &Revision) -> usize {
        revision.id.as_str().trim_start_matches("rev").parse().unwrap()
    }

    #[test]
    fn build_series_produces_one_sample_per_revision() {
        let revs = revisions(5);
        let series = build_series(&revs, |r| Ok(index_of(r) * 2));

        let counts: Vec<_> = series.samples().iter().map(|s| s.count).collect();
        assert_eq!(counts, [0, 2, 4, 6, 8]);
    }

    #[test]
    fn build_series_of_no_revisions_is_empty() {
        let series = build_series(&[], |_| Ok(1));
        assert!(series.is_empty());
        assert!(series.stats().is_none());
    }

    #[test]
    fn failures_degrade_to_zero_without_shortening_series() {
        let revs = revisions(4);
        let series = build_series(&revs, |r| {
            if index_of(r) == 2 {
                Err(HistoryError::tooling("reading tree", "corrupt"))
            } else {
                Ok(3)
            }
        });

        assert_eq!(series.len(), 4);
        assert_eq!(series.samples()[2].count, 0);
        assert!(series.samples()[2].is_degraded());
        assert_eq!(series.degraded_count(), 1);
    }

    #[test]
    fn revision_not_found_is_recorded_as_zero() {
        let revs = revisions(2);
        let series = build_series(&revs, |r| {
            Err(HistoryError::RevisionNotFound {
                revision: r.id.to_string(),
            })
        });

        assert_eq!(series.len(), 2);
        assert!(series.samples().iter().all(|s| s.count == 0 && s.is_degraded()));
    }

    #[test]
    fn cancellation_keeps_completed_prefix() {
        let revs = revisions(6);
        let token = CancelToken::new();
        let trip = token.clone();

        let outcome = Aggregator::new().with_cancel(token).build_series(&revs, |r| {
            if index_of(r) == 2 {
                trip.cancel();
            }
            Ok(1)
        });

        assert!(outcome.cancelled);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.revisions, 6);
        assert_eq!(outcome.series.len(), 3);
        let ids: Vec<_> = outcome.series.samples().iter().map(|s| s.revision.id.as_str()).collect();
        assert_eq!(ids, ["rev0", "rev1", "rev2"]);
    }

    #[test]
    fn cancelled_before_start_yields_empty_prefix() {
        let token = CancelToken::new();
        token.cancel();

        let outcome = Aggregator::new().with_cancel(token).build_series(&revisions(3), |_| Ok(1));
        assert!(outcome.cancelled);
        assert!(outcome.series.is_empty());
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_event(&self, event: &ScanEvent<'_>) {
            let label = match event {
                ScanEvent::Started { total } => format!("start:{total}"),
                ScanEvent::RevisionScanned { index, count, .. } => format!("ok:{index}:{count}"),
                ScanEvent::RevisionDegraded { index, .. } => format!("degraded:{index}"),
                ScanEvent::FileUnreadable { path, .. } => format!("file:{path}"),
                ScanEvent::Finished { scanned, cancelled } => format!("end:{scanned}:{cancelled}"),
            };
            self.events.lock().unwrap().push(label);
        }
    }

    #[test]
    fn progress_sink_sees_every_revision() {
        let sink = RecordingSink::default();

        let revs = revisions(2);
        let outcome = Aggregator::new().with_progress(&sink).build_series(&revs, |r| {
            if index_of(r) == 1 {
                Err(HistoryError::tooling("x", "y"))
            } else {
                Ok(7)
            }
        });

        assert!(outcome.is_complete());
        assert_eq!(
            sink.events.into_inner().unwrap(),
            ["start:2", "ok:0:7", "degraded:1", "end:2:false"]
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let revs = revisions(200);
        let scan = |r: &Revision| {
            let i = index_of(r);
            if i % 17 == 0 {
                Err(HistoryError::tooling("scan", "flaky"))
            } else {
                Ok(i % 11)
            }
        };

        let sequential = Aggregator::new().build_series(&revs, scan);
        let parallel = Aggregator::new().build_series_parallel(&revs, || (), |_, r| scan(r));

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_uses_per_worker_state() {
        let revs = revisions(50);
        let outcome = Aggregator::new().build_series_parallel(
            &revs,
            || 0usize,
            |calls, r| {
                *calls += 1;
                Ok(index_of(r))
            },
        );

        assert!(outcome.is_complete());
        let counts: Vec<_> = outcome.series.samples().iter().map(|s| s.count).collect();
        assert_eq!(counts, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn parallel_cancellation_keeps_ordered_prefix() {
        let token = CancelToken::new();
        token.cancel();

        let outcome = Aggregator::new()
            .with_cancel(token)
            .build_series_parallel(&revisions(10), || (), |_, _| Ok(1));

        assert!(outcome.cancelled);
        assert!(outcome.series.is_empty());
    }
}
