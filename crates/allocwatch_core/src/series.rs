//! Per-revision count samples and derived statistics.

use crate::history::Revision;

/// The count recorded for one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSample {
    /// The scanned revision.
    pub revision: Revision,
    /// Tokenized allocation calls across all matching files.
    pub count: usize,
    /// Why the count was forced to zero, when the scan failed.
    pub degraded: Option<String>,
}

impl CountSample {
    /// Creates a sample from a successful scan.
    #[must_use]
    pub const fn scanned(revision: Revision, count: usize) -> Self {
        Self {
            revision,
            count,
            degraded: None,
        }
    }

    /// Creates a zero sample recording a scan failure.
    #[must_use]
    pub fn degraded(revision: Revision, reason: impl Into<String>) -> Self {
        Self {
            revision,
            count: 0,
            degraded: Some(reason.into()),
        }
    }

    /// Returns `true` if the scan for this revision failed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Summary statistics over a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    /// Smallest count.
    pub min: usize,
    /// Largest count.
    pub max: usize,
    /// Arithmetic mean of all counts.
    pub mean: f64,
    /// Count at the most recent revision.
    pub last: usize,
}

/// Ordered sequence of samples, one per revision, oldest first.
///
/// Statistics are computed from the samples on every call, so they can
/// never disagree with the contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<CountSample>,
}

impl TimeSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample at the end of the series.
    pub fn push(&mut self, sample: CountSample) {
        self.samples.push(sample);
    }

    /// Returns the samples in order.
    #[must_use]
    pub fn samples(&self) -> &[CountSample] {
        &self.samples
    }

    /// Consumes the series and returns its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<CountSample> {
        self.samples
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the series holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the number of samples whose scan failed.
    #[must_use]
    pub fn degraded_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_degraded()).count()
    }

    /// Computes min, max, mean, and last over all samples, or `None` for an
    /// empty series.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "mean is a display statistic; counts never approach 2^52"
    )]
    pub fn stats(&self) -> Option<SeriesStats> {
        let last = self.samples.last()?.count;
        let counts = self.samples.iter().map(|s| s.count);

        let min = counts.clone().min().unwrap_or(0);
        let max = counts.clone().max().unwrap_or(0);
        let total: usize = counts.sum();

        Some(SeriesStats {
            min,
            max,
            mean: total as f64 / self.samples.len() as f64,
            last,
        })
    }
}

impl FromIterator<CountSample> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = CountSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn sample(id: &str, secs: i64, count: usize) -> CountSample {
        CountSample::scanned(Revision::new(id, Utc.timestamp_opt(secs, 0).unwrap()), count)
    }

    #[test]
    fn stats_of_empty_series_is_none() {
        assert!(TimeSeries::new().stats().is_none());
    }

    #[test]
    fn stats_cover_whole_series() {
        let series: TimeSeries = [sample("a", 1, 4), sample("b", 2, 10), sample("c", 3, 1)]
            .into_iter()
            .collect();

        let stats = series.stats().unwrap();
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 10);
        assert_eq!(stats.last, 1);
        assert!((stats.mean - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_follow_pushed_samples() {
        let mut series = TimeSeries::new();
        series.push(sample("a", 1, 2));
        assert_eq!(series.stats().unwrap().max, 2);

        series.push(sample("b", 2, 7));
        let stats = series.stats().unwrap();
        assert_eq!(stats.max, 7);
        assert_eq!(stats.last, 7);
        assert!((stats.mean - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn degraded_samples_count_as_zero() {
        let revision = Revision::new("x", Utc.timestamp_opt(5, 0).unwrap());
        let mut series = TimeSeries::new();
        series.push(sample("a", 1, 6));
        series.push(CountSample::degraded(revision, "tree unreadable"));

        assert_eq!(series.degraded_count(), 1);
        assert_eq!(series.stats().unwrap().min, 0);
        assert_eq!(series.samples()[1].degraded.as_deref(), Some("tree unreadable"));
    }
}
