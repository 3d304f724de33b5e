//! Text output formatting for detail results.

use std::io::Write;

use allocwatch_core::prelude::*;

use super::OutputContext;
use crate::ui::{self, colors, format_duration, indicators, truncate_with_ellipsis};

const MAX_LINE_CHARS: usize = 100;

/// Renders matches as `path:line | text`, followed by a summary line.
pub fn write(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    let matches = ctx.matches();

    if !matches.is_empty() {
        for record in matches {
            write_match(record, writer)?;
        }
        writeln!(writer)?;
    }

    write_summary(ctx, writer)?;
    writeln!(writer)?;

    Ok(())
}

fn write_match(record: &MatchRecord, writer: &mut dyn Write) -> anyhow::Result<()> {
    let text = truncate_with_ellipsis(record.text.trim(), MAX_LINE_CHARS);

    let multiplier = if record.calls > 1 {
        format!("  {}", colors::warning().apply_to(format!("×{}", record.calls)))
    } else {
        String::new()
    };

    writeln!(
        writer,
        "{}:{} {} {}{}",
        colors::secondary().apply_to(&record.path),
        colors::line_number().apply_to(record.line),
        colors::muted().apply_to("|"),
        colors::code().apply_to(text),
        multiplier,
    )?;

    Ok(())
}

fn write_summary(ctx: &OutputContext, writer: &mut dyn Write) -> anyhow::Result<()> {
    let location = ctx.report.map_or_else(
        || "no commits yet".to_string(),
        |r| r.revision.id.short().to_string(),
    );
    let timing = format!("({})", format_duration(ctx.elapsed));
    let calls = ctx.total_calls();

    if calls == 0 {
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            colors::success().apply_to(indicators::SUCCESS),
            colors::primary().apply_to("No allocation calls found"),
            colors::muted().apply_to("·"),
            colors::muted().apply_to("0 found"),
            colors::muted().apply_to("·"),
            colors::accent().apply_to(&location),
            colors::muted().apply_to(&timing),
        )?;
        return Ok(());
    }

    let files = ctx.file_count();

    writeln!(
        writer,
        "{} {} {} {} {} {} {}",
        colors::info().apply_to(indicators::INFO),
        colors::primary().apply_to(format!("{calls} {} found", ui::pluralise_word(calls, "call", "calls"))),
        colors::muted().apply_to("·"),
        colors::muted().apply_to(format!("{files} {}", ui::pluralise_word(files, "file", "files"))),
        colors::muted().apply_to("·"),
        colors::accent().apply_to(&location),
        colors::muted().apply_to(&timing),
    )?;

    Ok(())
}
