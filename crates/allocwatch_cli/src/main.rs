//! Command-line interface for allocwatch.
//!
//! # Commands
//!
//! - `allocwatch detail` - List allocation calls at one revision
//! - `allocwatch series` - Count allocation calls across every revision

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod git;
mod progress;
mod ui;

use std::path::PathBuf;

pub use allocwatch_core::CONFIG_FILENAME;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use console::style;

use crate::ui::colors;

#[derive(Debug, Parser)]
#[command(
    name = "allocwatch",
    version,
    styles = ui::clap_styles(),
    arg_required_else_help = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every allocation call at a single revision.
    #[command(visible_alias = "d")]
    Detail(DetailArgs),

    /// Count allocation calls at every revision in history.
    #[command(visible_alias = "s")]
    Series(SeriesArgs),
}

/// Output format for `allocwatch detail`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DetailFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Output format for `allocwatch series`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SeriesFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
    /// One row per revision: `revision,timestamp,count,degraded`.
    Csv,
}

/// Options shared by every scanning command. Each overrides the matching
/// `.allocwatch.toml` key.
#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// Path to `.allocwatch.toml` configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory prefix to scan (repeatable; replaces the configured list).
    #[arg(long = "dir", value_name = "DIR")]
    pub directories: Vec<String>,

    /// File extension to scan (repeatable; replaces the configured list).
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Allocation function to count (repeatable; replaces the configured list).
    #[arg(long = "function", value_name = "NAME")]
    pub functions: Vec<String>,

    /// Glob patterns to exclude, in addition to configured ones.
    #[arg(short, long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Skip files larger than this size in bytes.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Commit or ref to start from.
    #[arg(long, value_name = "REV")]
    pub rev: Option<String>,
}

/// Arguments for the `allocwatch detail` command.
#[derive(Debug, Parser)]
pub struct DetailArgs {
    /// Options shared with other scanning commands.
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: DetailFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `allocwatch series` command.
#[derive(Debug, Parser)]
pub struct SeriesArgs {
    /// Options shared with other scanning commands.
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Only scan the N most recent revisions.
    #[arg(short = 'n', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Follow only the first parent of merge commits.
    #[arg(long)]
    pub first_parent: bool,

    /// Number of parallel scanning threads.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: SeriesFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn main() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let cli = parse_cli();

    if let Err(e) = run(cli.command) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Detail(args) => commands::detail::run(&args),
        Command::Series(args) => commands::series::run(&args),
    }
}

fn build_about() -> String {
    format!(
        r"
  {} tracks how many malloc, calloc, and realloc calls a C or C++
  code base makes, at one revision or across its whole git history.

  Reads history straight from the object database. Never touches
  your working tree.",
        colors::accent().apply_to("allocwatch").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r"
  {}
    allocwatch detail                   List calls at HEAD
    allocwatch detail --rev v1.2        List calls at a tag
    allocwatch series                   Count calls across history
    allocwatch series -n 100            Only the last 100 revisions
    allocwatch series -f csv -o a.csv   Write the series as CSV
    allocwatch series --function xmalloc --dir lib",
        style("Examples:").bold()
    )
}
