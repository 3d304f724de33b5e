//! CSV output formatting for series results.

use std::borrow::Cow;
use std::io::Write;

use super::OutputContext;

const HEADER: &str = "revision,timestamp,count,degraded";

/// Writes one row per sample. The `degraded` column holds the failure
/// reason, or is empty for a successful scan.
pub fn write(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer, "{HEADER}")?;

    for sample in &ctx.report.samples {
        writeln!(
            writer,
            "{},{},{},{}",
            sample.revision.id,
            sample.revision.timestamp.to_rfc3339(),
            sample.count,
            escape_field(sample.degraded.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use allocwatch_core::prelude::*;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let rev = |id: &str, s: i64| Revision::new(id, Utc.timestamp_opt(s, 0).unwrap());
        let report = SeriesReport::from(SeriesOutcome {
            series: [
                CountSample::scanned(rev("a1", 0), 3),
                CountSample::degraded(rev("b2", 60), "reading tree, attempt 1"),
            ]
            .into_iter()
            .collect(),
            cancelled: false,
            revisions: 2,
        });
        let ctx = OutputContext {
            report: &report,
            elapsed: Duration::ZERO,
        };

        let mut out = Vec::new();
        write(&ctx, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(
            lines,
            [
                "revision,timestamp,count,degraded",
                "a1,1970-01-01T00:00:00+00:00,3,",
                "b2,1970-01-01T00:01:00+00:00,0,\"reading tree, attempt 1\"",
            ]
        );
    }

    #[test]
    fn escape_field_quotes_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
