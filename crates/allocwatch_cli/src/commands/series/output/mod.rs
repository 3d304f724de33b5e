//! Output formatting for series results.

mod csv;
mod json;
mod text;

use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use allocwatch_core::prelude::*;
use anyhow::Context as _;

use crate::{SeriesArgs, SeriesFormat};

/// Everything needed to render series output in any format.
#[derive(Debug)]
pub struct OutputContext<'a> {
    /// Samples, statistics, and run status.
    pub report: &'a SeriesReport,
    /// Wall-clock time for the scan.
    pub elapsed: Duration,
}

/// Writes series output to a file or stdout in the requested format.
pub fn write_output(args: &SeriesArgs, ctx: &OutputContext) -> anyhow::Result<()> {
    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("failed to create output file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_format(args.format, ctx, &mut writer)
    } else {
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        write_format(args.format, ctx, &mut writer)
    }
}

fn write_format(format: SeriesFormat, ctx: &OutputContext, writer: &mut dyn std::io::Write) -> anyhow::Result<()> {
    match format {
        SeriesFormat::Text => text::write(ctx, writer),
        SeriesFormat::Json => json::write(ctx, writer),
        SeriesFormat::Csv => csv::write(ctx, writer),
    }
}
