//! UI helpers for consistent output formatting.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Single-character Unicode glyphs used as status indicators.
pub mod indicators {
    /// Error indicator (✖).
    pub const ERROR: &str = "✖";
    /// Warning indicator (⚠).
    pub const WARNING: &str = "⚠";
    /// Informational indicator (ℹ).
    pub const INFO: &str = "ℹ";
    /// Success indicator (✓).
    pub const SUCCESS: &str = "✓";
}

/// Semantic colour palette for terminal output.
pub mod colors {
    use console::Style;

    /// Red - errors.
    pub const fn error() -> Style {
        Style::new().red()
    }

    /// Yellow - warnings and degraded samples.
    pub const fn warning() -> Style {
        Style::new().yellow()
    }

    /// Cyan - informational messages.
    pub const fn info() -> Style {
        Style::new().cyan()
    }

    /// Green - success messages.
    pub const fn success() -> Style {
        Style::new().green()
    }

    /// White bold - primary/headline text.
    pub const fn primary() -> Style {
        Style::new().white().bold()
    }

    /// Light grey - secondary descriptive text.
    pub const fn secondary() -> Style {
        Style::new().color256(252)
    }

    /// Dark grey - muted/contextual text.
    pub const fn muted() -> Style {
        Style::new().color256(243)
    }

    /// Cyan - accent highlights (revision hashes, commands).
    pub const fn accent() -> Style {
        Style::new().cyan()
    }

    /// White - emphasised inline text.
    pub const fn emphasis() -> Style {
        Style::new().white()
    }

    /// Dark grey - gutter line numbers.
    pub const fn line_number() -> Style {
        Style::new().color256(243)
    }

    /// Light grey - source code lines.
    pub const fn code() -> Style {
        Style::new().color256(252)
    }
}

/// Process exit codes.
pub mod exit {
    /// An unrecoverable error occurred.
    pub const ERROR: i32 = 2;
    /// The run was cancelled with Ctrl-C; a partial series was reported.
    pub const INTERRUPTED: i32 = 130;
}

/// Prints a styled `allocwatch <command>` header with surrounding blank lines.
pub fn print_command_header(command: &str) {
    println!();
    println!(
        "{} {}",
        colors::accent().bold().apply_to("allocwatch"),
        colors::muted().apply_to(command)
    );
    println!();
}

/// Prints a red error message to stderr.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        colors::error().apply_to(indicators::ERROR),
        colors::secondary().apply_to(message)
    );
}

/// Prints a yellow warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        colors::warning().apply_to(indicators::WARNING),
        colors::secondary().apply_to(message)
    );
}

/// Returns `singular` when `count` is 1, otherwise `plural`.
#[must_use]
pub const fn pluralise_word<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Truncates a string to `max_chars`, appending an ellipsis if shortened.
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

const PROGRESS_TICK_MS: u64 = 100;

/// Creates a progress bar for revision scanning with the given total.
#[must_use]
pub fn create_revision_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);

    #[expect(
        clippy::expect_used,
        reason = "static template string; failure is a programmer error"
    )]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/243} {percent:>3}% {pos}/{len} revisions ({elapsed} elapsed)")
            .expect("invalid progress template")
            .progress_chars("━━╸"),
    );

    pb.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    pb
}

/// Renders `value` as a horizontal bar of at most `width` cells, scaled
/// against `max`.
#[must_use]
pub fn scaled_bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }

    let cells = (value.saturating_mul(width)).div_ceil(max).min(width);
    "▇".repeat(cells)
}

const MICROSECOND_NS: u128 = 1_000;
const MILLISECOND_NS: u128 = 1_000_000;
const SECOND_NS: u128 = 1_000_000_000;

/// Formats a duration as a human-readable string with the most appropriate
/// unit (ns, µs, ms, or s).
#[expect(
    clippy::cast_precision_loss,
    reason = "nanosecond-to-float conversion is display-only; precision loss is acceptable"
)]
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();

    if nanos < MICROSECOND_NS {
        format!("{nanos}ns")
    } else if nanos < MILLISECOND_NS {
        format!("{:.1}µs", nanos as f64 / MICROSECOND_NS as f64)
    } else if nanos < SECOND_NS {
        format!("{:.1}ms", nanos as f64 / MILLISECOND_NS as f64)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

/// Returns the shared clap colour theme used by all CLI subcommands.
#[must_use]
pub fn clap_styles() -> clap::builder::Styles {
    use clap::builder::styling::{AnsiColor, Effects, Style};

    clap::builder::Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .usage(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .literal(Style::new().fg_color(Some(AnsiColor::Cyan.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::BrightBlack.into())))
        .valid(Style::new().fg_color(Some(AnsiColor::Green.into())))
        .invalid(Style::new().fg_color(Some(AnsiColor::Red.into())))
        .error(
            Style::new()
                .fg_color(Some(AnsiColor::Red.into()))
                .effects(Effects::BOLD),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators_are_single_chars() {
        assert_eq!(indicators::ERROR.chars().count(), 1);
        assert_eq!(indicators::WARNING.chars().count(), 1);
        assert_eq!(indicators::INFO.chars().count(), 1);
        assert_eq!(indicators::SUCCESS.chars().count(), 1);
    }

    #[test]
    fn test_pluralise_word() {
        assert_eq!(pluralise_word(0, "call", "calls"), "calls");
        assert_eq!(pluralise_word(1, "call", "calls"), "call");
        assert_eq!(pluralise_word(2, "call", "calls"), "calls");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("longer text", 6), "longe…");
    }

    #[test]
    fn test_scaled_bar() {
        assert_eq!(scaled_bar(0, 10, 20), "");
        assert_eq!(scaled_bar(5, 0, 20), "");
        assert_eq!(scaled_bar(10, 10, 20).chars().count(), 20);
        assert_eq!(scaled_bar(1, 100, 20).chars().count(), 1);
        assert_eq!(scaled_bar(5, 10, 20).chars().count(), 10);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
        assert_eq!(format_duration(Duration::from_micros(500)), "500.0µs");
        assert_eq!(format_duration(Duration::from_millis(500)), "500.0ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
    }
}
