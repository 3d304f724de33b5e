//! JSON output formatting for detail results.

use std::io::Write;

use allocwatch_core::prelude::*;
use serde::Serialize;

use super::OutputContext;

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    mode: &'static str,
    revision: Option<JsonRevision>,
    metadata: JsonMetadata,
    summary: JsonSummary,
    matches: Vec<JsonMatch<'a>>,
}

#[derive(Serialize)]
struct JsonRevision {
    id: String,
    short_id: String,
    timestamp: String,
}

#[derive(Serialize)]
struct JsonMetadata {
    duration_ms: u64,
}

#[derive(Serialize)]
struct JsonSummary {
    calls: usize,
    lines: usize,
    files: usize,
}

#[derive(Serialize)]
struct JsonMatch<'a> {
    path: &'a str,
    line: usize,
    calls: usize,
    text: &'a str,
}

const VERSION: &str = "1.0";
const MODE: &str = "detail";

/// Serialises detail matches as a pretty-printed JSON report.
pub fn write(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    let report = build_report(ctx);
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn build_report<'a>(ctx: &'a OutputContext) -> JsonReport<'a> {
    let matches = ctx.matches();

    JsonReport {
        version: VERSION,
        mode: MODE,
        revision: ctx.report.map(|r| convert_revision(&r.revision)),
        metadata: JsonMetadata {
            duration_ms: u64::try_from(ctx.elapsed.as_millis()).unwrap_or(u64::MAX),
        },
        summary: JsonSummary {
            calls: ctx.total_calls(),
            lines: matches.len(),
            files: ctx.file_count(),
        },
        matches: matches.iter().map(convert_match).collect(),
    }
}

fn convert_revision(revision: &Revision) -> JsonRevision {
    JsonRevision {
        id: revision.id.to_string(),
        short_id: revision.id.short().to_string(),
        timestamp: revision.timestamp.to_rfc3339(),
    }
}

fn convert_match(record: &MatchRecord) -> JsonMatch<'_> {
    JsonMatch {
        path: &record.path,
        line: record.line,
        calls: record.calls,
        text: &record.text,
    }
}
