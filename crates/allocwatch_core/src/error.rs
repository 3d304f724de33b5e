use thiserror::Error;

/// Errors that can occur when compiling an allocation pattern family.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The family contained no function names.
    #[error("pattern family is empty; configure at least one function name")]
    EmptyFamily,

    /// A function name is not a valid C identifier.
    #[error("invalid function name '{name}': expected a C identifier")]
    InvalidFunctionName {
        /// The rejected name as written in configuration.
        name: String,
    },

    /// The exact-match regular expression failed to compile.
    #[error("invalid regex for pattern family: {source}")]
    InvalidRegex {
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The coarse keyword automaton failed to build.
    #[error("failed to build keyword automaton: {source}")]
    Automaton {
        /// The underlying Aho-Corasick build error.
        #[source]
        source: aho_corasick::BuildError,
    },
}

/// Errors raised by a history source while enumerating revisions, listing
/// paths, or fetching content.
///
/// Only [`HistoryError::HistoryUnavailable`] and a [`HistoryError::Tooling`]
/// raised during enumeration are fatal to a run. Everything else degrades a
/// single sample or a single file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// The configured reference point does not resolve to any revision.
    #[error("no history available at '{reference}'")]
    HistoryUnavailable {
        /// The reference that failed to resolve (e.g. `"HEAD"`).
        reference: String,
    },

    /// The history backend could not be opened or failed mid-operation.
    #[error("{context}: {message}")]
    Tooling {
        /// What was being attempted when the backend failed.
        context: String,
        /// Backend error rendered as text.
        message: String,
    },

    /// The revision identifier is stale or unknown to the history source.
    #[error("revision '{revision}' not found")]
    RevisionNotFound {
        /// The identifier that could not be resolved.
        revision: String,
    },

    /// The path did not exist in the given revision.
    #[error("'{path}' does not exist at revision '{revision}'")]
    PathNotFoundAtRevision {
        /// Revision that was searched.
        revision: String,
        /// Repository-relative path that was requested.
        path: String,
    },
}

impl HistoryError {
    /// Builds a [`HistoryError::Tooling`] from any displayable backend error.
    pub fn tooling(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Tooling {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Returns `true` if the error should degrade a single sample or file
    /// rather than abort the run.
    ///
    /// `Tooling` is recoverable here because this classification is only
    /// consulted once enumeration has already succeeded.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::HistoryUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooling_renders_context_and_message() {
        let err = HistoryError::tooling("opening repository", "not a git repository");
        assert_eq!(err.to_string(), "opening repository: not a git repository");
    }

    #[test]
    fn only_history_unavailable_is_fatal() {
        let fatal = HistoryError::HistoryUnavailable {
            reference: "HEAD".into(),
        };
        assert!(!fatal.is_recoverable());

        assert!(HistoryError::tooling("x", "y").is_recoverable());
        assert!(
            HistoryError::RevisionNotFound {
                revision: "abc".into()
            }
            .is_recoverable()
        );
        assert!(
            HistoryError::PathNotFoundAtRevision {
                revision: "abc".into(),
                path: "src/a.c".into(),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn path_not_found_message_names_path_and_revision() {
        let err = HistoryError::PathNotFoundAtRevision {
            revision: "deadbeef".into(),
            path: "src/main.c".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("src/main.c"));
        assert!(msg.contains("deadbeef"));
    }
}
