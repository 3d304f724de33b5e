//! Output formatting for detail results.

mod json;
mod text;

use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use allocwatch_core::prelude::*;
use anyhow::Context as _;

use crate::{DetailArgs, DetailFormat};

/// Everything needed to render detail output in any format.
#[derive(Debug)]
pub struct OutputContext<'a> {
    /// The scanned revision and its matches; `None` when the repository has
    /// no commits yet.
    pub report: Option<&'a DetailReport>,
    /// Wall-clock time for the scan.
    pub elapsed: Duration,
}

impl OutputContext<'_> {
    fn matches(&self) -> &[MatchRecord] {
        self.report.map(|r| r.matches.as_slice()).unwrap_or_default()
    }

    fn total_calls(&self) -> usize {
        self.report.map_or(0, DetailReport::total_calls)
    }

    fn file_count(&self) -> usize {
        self.report.map_or(0, DetailReport::file_count)
    }
}

/// Writes detail output to a file or stdout in the requested format.
pub fn write_output(args: &DetailArgs, ctx: &OutputContext) -> anyhow::Result<()> {
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

fn write_format(format: DetailFormat, ctx: &OutputContext, writer: &mut dyn std::io::Write) -> anyhow::Result<()> {
    match format {
        DetailFormat::Text => text::write(ctx, writer),
        DetailFormat::Json => json::write(ctx, writer),
    }
}
