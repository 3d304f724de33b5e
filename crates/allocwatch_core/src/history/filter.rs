use globset::GlobSet;

/// Selects which tracked paths take part in a scan.
///
/// Paths are repository-relative and `/`-separated. A path is accepted when
/// it lies under one of the directories, carries one of the extensions, and
/// matches none of the exclude globs. An empty directory or extension list
/// accepts everything on that axis.
#[derive(Debug, Clone)]
pub struct PathFilter {
    directories: Vec<String>,
    extensions: Vec<String>,
    excludes: GlobSet,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new())
    }
}

impl PathFilter {
    /// Creates a filter from directory prefixes and file extensions.
    ///
    /// Leading `./` and surrounding slashes are stripped from directories;
    /// extensions are lowercased and may be given with or without a dot.
    pub fn new<D, E>(directories: impl IntoIterator<Item = D>, extensions: impl IntoIterator<Item = E>) -> Self
    where
        D: AsRef<str>,
        E: AsRef<str>,
    {
        let directories = directories
            .into_iter()
            .map(|d| normalise_directory(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();

        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            directories,
            extensions,
            excludes: GlobSet::empty(),
        }
    }

    /// Drops paths matching any glob in `excludes`.
    #[must_use]
    pub fn with_excludes(mut self, excludes: GlobSet) -> Self {
        self.excludes = excludes;
        self
    }

    /// Returns the normalised directory prefixes.
    #[must_use]
    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    /// Returns the normalised extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns `true` if `path` lies under one of the directory prefixes.
    #[must_use]
    pub fn is_under_directory(&self, path: &str) -> bool {
        self.directories.is_empty()
            || self.directories.iter().any(|dir| {
                path.strip_prefix(dir.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
    }

    /// Returns `true` if `path` passes every criterion of the filter.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.is_under_directory(path) && self.has_extension(path) && !self.excludes.is_match(path)
    }

    fn has_extension(&self, path: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        let Some((stem, ext)) = file_name.rsplit_once('.') else {
            return false;
        };

        !stem.is_empty() && self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

fn normalise_directory(dir: &str) -> String {
    let dir = dir.trim();
    let dir = dir.strip_prefix("./").unwrap_or(dir);
    dir.trim_matches('/').to_string()
}
