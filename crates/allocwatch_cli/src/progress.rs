//! Progress reporting and interrupt handling for long scans.

use allocwatch_core::prelude::*;
use anyhow::Context as _;
use indicatif::ProgressBar;

use crate::ui::{create_revision_progress, print_warning};

/// Turns scan events into a progress bar and user-facing warnings.
///
/// Warnings are printed above the bar so it is not torn. With the bar hidden
/// (JSON/CSV output, file output, or a detail run) warnings still go to
/// stderr.
#[derive(Debug)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Creates a reporter that draws a bar sized for `total` revisions.
    #[must_use]
    pub fn with_bar(total: usize) -> Self {
        Self {
            bar: create_revision_progress(total),
        }
    }

    /// Creates a reporter that only prints warnings.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn warn(&self, message: &str) {
        self.bar.suspend(|| print_warning(message));
    }
}

impl ProgressSink for ProgressReporter {
    fn on_event(&self, event: &ScanEvent<'_>) {
        match event {
            ScanEvent::Started { total } => self.bar.set_length(*total as u64),
            ScanEvent::RevisionScanned { .. } => self.bar.inc(1),
            ScanEvent::RevisionDegraded { revision, error, .. } => {
                self.warn(&format!("revision {} counted as 0: {error}", revision.id.short()));
                self.bar.inc(1);
            }
            ScanEvent::FileUnreadable { revision, path, error } => {
                self.warn(&format!("skipped '{path}' at {}: {error}", revision.short()));
            }
            ScanEvent::Finished { .. } => self.bar.finish_and_clear(),
        }
    }
}

/// Trips `token` when the user presses Ctrl-C.
///
/// The signal is awaited on a dedicated thread with its own single-threaded
/// runtime, so the scan itself stays on the rayon pool.
pub fn cancel_on_interrupt(token: CancelToken) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start signal handler")?;

    std::thread::Builder::new()
        .name("allocwatch-signal".into())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });
        })
        .context("failed to spawn signal handler")?;

    Ok(())
}
