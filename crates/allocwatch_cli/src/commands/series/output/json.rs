//! JSON output formatting for series results.

use std::io::Write;

use allocwatch_core::prelude::*;
use serde::Serialize;

use super::OutputContext;

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    mode: &'static str,
    metadata: JsonMetadata,
    summary: Option<JsonSummary>,
    samples: Vec<JsonSample<'a>>,
}

#[derive(Serialize)]
struct JsonMetadata {
    revisions_listed: usize,
    revisions_scanned: usize,
    cancelled: bool,
    duration_ms: u64,
}

#[derive(Serialize)]
struct JsonSummary {
    min: usize,
    max: usize,
    mean: f64,
    last: usize,
    degraded: usize,
}

#[derive(Serialize)]
struct JsonSample<'a> {
    revision: &'a str,
    timestamp: String,
    count: usize,
    degraded: Option<&'a str>,
}

const VERSION: &str = "1.0";
const MODE: &str = "series";

/// Serialises the series as a pretty-printed JSON report.
pub fn write(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    let report = build_report(ctx);
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn build_report<'a>(ctx: &OutputContext<'a>) -> JsonReport<'a> {
    let report = ctx.report;

    JsonReport {
        version: VERSION,
        mode: MODE,
        metadata: JsonMetadata {
            revisions_listed: report.revisions,
            revisions_scanned: report.samples.len(),
            cancelled: report.cancelled,
            duration_ms: u64::try_from(ctx.elapsed.as_millis()).unwrap_or(u64::MAX),
        },
        summary: report.stats.map(|s| JsonSummary {
            min: s.min,
            max: s.max,
            mean: s.mean,
            last: s.last,
            degraded: report.degraded,
        }),
        samples: report.samples.iter().map(convert_sample).collect(),
    }
}

fn convert_sample(sample: &CountSample) -> JsonSample<'_> {
    JsonSample {
        revision: sample.revision.id.as_str(),
        timestamp: sample.revision.timestamp.to_rfc3339(),
        count: sample.count,
        degraded: sample.degraded.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn render(report: &SeriesReport) -> serde_json::Value {
        let ctx = OutputContext {
            report,
            elapsed: Duration::from_millis(40),
        };
        let mut out = Vec::new();
        write(&ctx, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn samples_and_summary_are_serialised() {
        let rev = |id: &str, s: i64| Revision::new(id, Utc.timestamp_opt(s, 0).unwrap());
        let report = SeriesReport::from(SeriesOutcome {
            series: [
                CountSample::scanned(rev("a1", 0), 3),
                CountSample::degraded(rev("b2", 3600), "tree missing"),
                CountSample::scanned(rev("c3", 7200), 6),
            ]
            .into_iter()
            .collect(),
            cancelled: false,
            revisions: 3,
        });

        let json = render(&report);

        assert_eq!(json["mode"], "series");
        assert_eq!(json["metadata"]["revisions_listed"], 3);
        assert_eq!(json["metadata"]["cancelled"], false);
        assert_eq!(json["summary"]["min"], 0);
        assert_eq!(json["summary"]["max"], 6);
        assert_eq!(json["summary"]["mean"], 3.0);
        assert_eq!(json["summary"]["last"], 6);
        assert_eq!(json["summary"]["degraded"], 1);
        assert_eq!(json["samples"][1]["revision"], "b2");
        assert_eq!(json["samples"][1]["timestamp"], "1970-01-01T01:00:00+00:00");
        assert_eq!(json["samples"][1]["degraded"], "tree missing");
        assert!(json["samples"][0]["degraded"].is_null());
    }

    #[test]
    fn empty_series_has_null_summary() {
        let report = SeriesReport::from(SeriesOutcome {
            series: TimeSeries::new(),
            cancelled: false,
            revisions: 0,
        });

        let json = render(&report);
        assert!(json["summary"].is_null());
        assert_eq!(json["samples"].as_array().map(Vec::len), Some(0));
    }
}
