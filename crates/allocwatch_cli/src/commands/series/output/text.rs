//! Text output formatting for series results.

use std::io::Write;

use allocwatch_core::prelude::*;
use chrono::Local;

use super::OutputContext;
use crate::ui::{self, colors, format_duration, indicators, scaled_bar, truncate_with_ellipsis};

const BAR_WIDTH: usize = 32;
const COUNT_WIDTH: usize = 7;
const MAX_REASON_CHARS: usize = 60;

/// Renders one row per revision with a scaled bar, followed by statistics.
pub fn write(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    let report = ctx.report;

    if !report.is_empty() {
        let max = report.stats.map_or(0, |s| s.max);
        for sample in &report.samples {
            write_sample(sample, max, writer)?;
        }
    }

    writeln!(writer)?;
    write_summary(ctx, writer)?;
    writeln!(writer)?;

    Ok(())
}

fn write_sample(sample: &CountSample, max: usize, writer: &mut dyn Write) -> anyhow::Result<()> {
    let date = sample
        .revision
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();

    let tail = match &sample.degraded {
        Some(reason) => format!(
            "{} {}",
            colors::warning().apply_to(indicators::WARNING),
            colors::muted().apply_to(truncate_with_ellipsis(reason, MAX_REASON_CHARS)),
        ),
        None => colors::accent().apply_to(scaled_bar(sample.count, max, BAR_WIDTH)).to_string(),
    };

    writeln!(
        writer,
        "  {}  {}  {}  {}",
        colors::secondary().apply_to(date),
        colors::emphasis().apply_to(sample.revision.id.short()),
        colors::primary().apply_to(format!("{:>COUNT_WIDTH$}", sample.count)),
        tail,
    )?;

    Ok(())
}

fn write_summary(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    let report = ctx.report;
    let timing = format!("({})", format_duration(ctx.elapsed));

    let Some(stats) = report.stats else {
        let (indicator, headline) = if report.cancelled {
            (colors::warning().apply_to(indicators::WARNING), "Interrupted before any revision")
        } else {
            (colors::success().apply_to(indicators::SUCCESS), "No revisions to scan")
        };

        writeln!(
            writer,
            "{} {} {} {} {}",
            indicator,
            colors::primary().apply_to(headline),
            colors::muted().apply_to("·"),
            colors::muted().apply_to(format!("{} revisions", report.revisions)),
            colors::muted().apply_to(&timing),
        )?;
        return Ok(());
    };

    let scanned = report.samples.len();
    let (indicator, headline) = if report.cancelled {
        (
            colors::warning().apply_to(indicators::WARNING),
            format!("{scanned} of {} revisions (interrupted)", report.revisions),
        )
    } else {
        (
            colors::success().apply_to(indicators::SUCCESS),
            format!("{scanned} {}", ui::pluralise_word(scanned, "revision", "revisions")),
        )
    };

    let degraded = if report.degraded > 0 {
        format!(
            " {} {}",
            colors::muted().apply_to("·"),
            colors::warning().apply_to(format!("{} degraded", report.degraded)),
        )
    } else {
        String::new()
    };

    writeln!(
        writer,
        "{} {} {} {} {} {}{} {}",
        indicator,
        colors::primary().apply_to(headline),
        colors::muted().apply_to("·"),
        colors::secondary().apply_to(format!("last {}", stats.last)),
        colors::muted().apply_to("·"),
        colors::muted().apply_to(format!("min {} · max {} · mean {:.1}", stats.min, stats.max, stats.mean)),
        degraded,
        colors::muted().apply_to(&timing),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn rev(id: &str, secs: i64) -> Revision {
        Revision::new(id, Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn render(report: &SeriesReport) -> String {
        let ctx = OutputContext {
            report,
            elapsed: Duration::from_millis(12),
        };
        let mut out = Vec::new();
        write(&ctx, &mut out).unwrap();
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned()
    }

    fn report(samples: Vec<CountSample>, cancelled: bool, revisions: usize) -> SeriesReport {
        SeriesReport::from(SeriesOutcome {
            series: samples.into_iter().collect(),
            cancelled,
            revisions,
        })
    }

    #[test]
    fn rows_and_statistics_are_printed() {
        let report = report(
            vec![
                CountSample::scanned(rev("aaaaaaaaaa", 0), 2),
                CountSample::scanned(rev("bbbbbbbbbb", 60), 4),
            ],
            false,
            2,
        );

        let out = render(&report);
        assert!(out.contains("aaaaaaa"));
        assert!(out.contains("bbbbbbb"));
        assert!(out.contains("2 revisions"));
        assert!(out.contains("last 4"));
        assert!(out.contains("min 2 · max 4 · mean 3.0"));
    }

    #[test]
    fn degraded_rows_show_reason() {
        let report = report(
            vec![
                CountSample::scanned(rev("a", 0), 1),
                CountSample::degraded(rev("b", 1), "reading tree of b: corrupt"),
            ],
            false,
            2,
        );

        let out = render(&report);
        assert!(out.contains("reading tree of b: corrupt"));
        assert!(out.contains("1 degraded"));
    }

    #[test]
    fn empty_history_is_reported_explicitly() {
        let out = render(&report(Vec::new(), false, 0));
        assert!(out.contains("No revisions to scan"));
    }

    #[test]
    fn cancelled_series_is_flagged() {
        let report = report(vec![CountSample::scanned(rev("a", 0), 1)], true, 5);
        let out = render(&report);
        assert!(out.contains("1 of 5 revisions (interrupted)"));
    }
}
