use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::history::PathFilter;
use crate::pattern::{DEFAULT_FUNCTIONS, PatternCounter};

const DEFAULT_DIRECTORIES: &[&str] = &["src", "include"];
const DEFAULT_EXTENSIONS: &[&str] = &["c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx"];
const DEFAULT_REFERENCE: &str = "HEAD";

/// Project-level configuration loaded from `.allocwatch.toml`.
///
/// Every field is optional. A missing file, or a missing key, falls back to
/// scanning C and C++ sources under `src/` and `include/` for `malloc`,
/// `calloc`, and `realloc` reachable from `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory prefixes to scan, relative to the repository root.
    pub directories: Vec<String>,

    /// File extensions to scan, without the leading dot.
    pub extensions: Vec<String>,

    /// Allocation function names to count.
    pub functions: Vec<String>,

    /// Glob patterns for paths to leave out.
    pub exclude_paths: Vec<String>,

    /// Maximum file size in bytes. Larger files are skipped.
    pub max_file_size: Option<u64>,

    /// Revision the history walk starts from.
    pub reference: String,

    /// Follow only the first parent of merge commits.
    pub first_parent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directories: to_strings(DEFAULT_DIRECTORIES),
            extensions: to_strings(DEFAULT_EXTENSIONS),
            functions: to_strings(DEFAULT_FUNCTIONS),
            exclude_paths: Vec::new(),
            max_file_size: None,
            reference: DEFAULT_REFERENCE.to_string(),
            first_parent: false,
        }
    }
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a `.allocwatch.toml` file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Compiles the configured function family.
    pub fn pattern_counter(&self) -> Result<PatternCounter, PatternError> {
        PatternCounter::new(&self.functions)
    }

    /// Builds the directory and extension filter. Exclude globs are compiled
    /// by the caller, which decides how to report invalid ones.
    #[must_use]
    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(&self.directories, &self.extensions)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|&s| s.to_string()).collect()
}

/// Errors that can occur when reading or parsing `.allocwatch.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// Path to the config file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML or unexpected keys.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// Path to the config file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Returns the file path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}
