//! Detail command - lists every allocation call at one revision.

mod output;

use std::time::Instant;

use allocwatch_core::prelude::*;

use self::output::OutputContext;
use super::context::ScanContext;
use crate::git::Repo;
use crate::progress::ProgressReporter;
use crate::ui::print_command_header;
use crate::{DetailArgs, DetailFormat};

/// Executes the `allocwatch detail` command.
pub fn run(args: &DetailArgs) -> super::Result {
    let start = Instant::now();

    if should_show_header(args) {
        print_command_header("detail");
    }

    let context = ScanContext::load(&args.scan)?;
    let repo = Repo::open_cwd()?;
    let history = repo.history(&context.walk);

    let report = match history.resolve_start()? {
        Some(revision) => {
            let warnings = ProgressReporter::hidden();
            let report = RevisionScanner::new(&history, &context.filter, &context.counter)
                .with_limits(context.limits)
                .with_progress(Some(&warnings))
                .detail(&revision)?;
            Some(report)
        }
        None => None,
    };

    let ctx = OutputContext {
        report: report.as_ref(),
        elapsed: start.elapsed(),
    };

    output::write_output(args, &ctx)
}

fn should_show_header(args: &DetailArgs) -> bool {
    args.output.is_none() && matches!(args.format, DetailFormat::Text)
}
