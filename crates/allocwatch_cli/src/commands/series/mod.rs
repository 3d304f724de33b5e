//! Series command - counts allocation calls at every revision in history.

mod output;

use std::time::Instant;

use allocwatch_core::prelude::*;
use anyhow::Context as _;
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use self::output::OutputContext;
use super::context::ScanContext;
use crate::git::Repo;
use crate::progress::{ProgressReporter, cancel_on_interrupt};
use crate::ui::{exit, print_command_header, print_warning};
use crate::{SeriesArgs, SeriesFormat};

/// Executes the `allocwatch series` command.
pub fn run(args: &SeriesArgs) -> super::Result {
    configure_thread_pool(args.concurrency)?;

    let show_progress = should_show_progress(args);
    let start = Instant::now();

    if show_progress {
        print_command_header("series");
    }

    let mut context = ScanContext::load(&args.scan)?;
    context.walk.first_parent |= args.first_parent;
    context.walk.limit = args.limit;

    let repo = Repo::open_cwd()?;

    if repo.is_shallow() {
        #[cfg(feature = "tracing")]
        warn!("repository is a shallow clone");

        print_warning(
            "shallow clone detected, series limited to available commits\nrun `git fetch --unshallow` for full history\n",
        );
    }

    let revisions = repo
        .history(&context.walk)
        .list_revisions()
        .context("listing revisions")?;

    #[cfg(feature = "tracing")]
    debug!(
        revisions = revisions.len(),
        reference = %context.walk.reference,
        first_parent = context.walk.first_parent,
        "revisions listed"
    );

    let token = CancelToken::new();
    cancel_on_interrupt(token.clone())?;

    let reporter = if show_progress && !revisions.is_empty() {
        ProgressReporter::with_bar(revisions.len())
    } else {
        ProgressReporter::hidden()
    };

    let outcome = Aggregator::new()
        .with_progress(&reporter)
        .with_cancel(token)
        .build_series_parallel(
            &revisions,
            || repo.history(&context.walk),
            |history, revision| {
                RevisionScanner::new(&*history, &context.filter, &context.counter)
                    .with_limits(context.limits)
                    .with_progress(Some(&reporter))
                    .count(&revision.id)
            },
        );

    let report = SeriesReport::from(outcome);

    if report.cancelled {
        #[cfg(feature = "tracing")]
        warn!(scanned = report.samples.len(), total = report.revisions, "series interrupted");

        print_warning(&format!(
            "interrupted after {} of {} revisions, reporting the completed prefix",
            report.samples.len(),
            report.revisions
        ));
    }

    let ctx = OutputContext {
        report: &report,
        elapsed: start.elapsed(),
    };

    output::write_output(args, &ctx)?;

    if report.cancelled {
        std::process::exit(exit::INTERRUPTED);
    }

    Ok(())
}

fn should_show_progress(args: &SeriesArgs) -> bool {
    args.output.is_none() && matches!(args.format, SeriesFormat::Text)
}

/// Configures the global rayon thread pool with the requested number of
/// threads, if specified.
fn configure_thread_pool(concurrency: Option<usize>) -> anyhow::Result<()> {
    if let Some(n) = concurrency {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("failed to configure thread pool")?;
    }
    Ok(())
}
