//! Scan context - configuration merged with command-line overrides.

use std::path::Path;

use allocwatch_core::prelude::*;
use anyhow::Context as _;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::git::WalkOptions;
use crate::{CONFIG_FILENAME, ScanArgs};

/// Everything a command needs to scan a revision.
#[derive(Debug)]
pub struct ScanContext {
    /// The compiled function family.
    pub counter: PatternCounter,
    /// Directory, extension, and exclude filter.
    pub filter: PathFilter,
    /// Per-file limits.
    pub limits: ScanLimits,
    /// Where the history walk starts and how it proceeds.
    pub walk: WalkOptions,
}

impl ScanContext {
    /// Loads `.allocwatch.toml` (or `--config`) and applies CLI overrides.
    pub fn load(args: &ScanArgs) -> anyhow::Result<Self> {
        if let Some(path) = &args.config
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let config_path = args.config.as_deref().unwrap_or(Path::new(CONFIG_FILENAME));
        let config = Config::load(config_path).context("loading config")?;

        Self::from_config(config, args)
    }

    fn from_config(mut config: Config, args: &ScanArgs) -> anyhow::Result<Self> {
        apply_overrides(&mut config, args);

        let counter = config.pattern_counter().context("compiling function family")?;
        let excludes = build_excludes(&config.exclude_paths, &args.exclude);
        let filter = config.path_filter().with_excludes(excludes);

        Ok(Self {
            counter,
            filter,
            limits: ScanLimits {
                max_file_size: config.max_file_size,
            },
            walk: WalkOptions {
                reference: config.reference,
                first_parent: config.first_parent,
                limit: None,
            },
        })
    }
}

fn apply_overrides(config: &mut Config, args: &ScanArgs) {
    if !args.directories.is_empty() {
        config.directories.clone_from(&args.directories);
    }
    if !args.extensions.is_empty() {
        config.extensions.clone_from(&args.extensions);
    }
    if !args.functions.is_empty() {
        config.functions.clone_from(&args.functions);
    }
    if let Some(max) = args.max_file_size {
        config.max_file_size = Some(max);
    }
    if let Some(rev) = &args.rev {
        config.reference.clone_from(rev);
    }
}

fn build_excludes(config_excludes: &[String], arg_excludes: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();

    for pattern in config_excludes.iter().chain(arg_excludes.iter()) {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                crate::ui::print_warning(&format!("invalid exclude pattern '{pattern}': {e}"));
            }
        }
    }

    builder.build().unwrap_or_else(|_| GlobSet::empty())
}
