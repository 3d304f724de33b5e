//! Allocation pattern family and the two-stage counter.
//!
//! Counting runs in two composable stages:
//!
//! 1. [`CoarseFilter`] - an Aho-Corasick keyword search that ignores
//!    identifier boundaries. It may over-select but never misses a call the
//!    exact stage would count.
//! 2. [`ExactMatcher`] - a regex plus token-boundary check that produces the
//!    authoritative count.
//!
//! [`PatternCounter`] only runs stage two when stage one reports a candidate,
//! so the result is always identical to running stage two alone.

mod coarse;
mod exact;

pub use self::coarse::CoarseFilter;
pub use self::exact::ExactMatcher;

use crate::error::PatternError;
use crate::text::{find_line_end, find_line_start};

/// Allocation functions counted when no family is configured.
pub const DEFAULT_FUNCTIONS: &[&str] = &["malloc", "calloc", "realloc"];

/// A source line containing one or more tokenized calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// One-based line number.
    pub line: usize,
    /// Line text without the line terminator.
    pub text: String,
    /// Number of calls on this line.
    pub calls: usize,
}

/// Two-stage counter for a family of allocation function names.
#[derive(Debug)]
pub struct PatternCounter {
    functions: Box<[Box<str>]>,
    coarse: CoarseFilter,
    exact: ExactMatcher,
}

impl PatternCounter {
    /// Compiles a counter for the given function names.
    ///
    /// Names are de-duplicated; each must be a C identifier.
    pub fn new<S: AsRef<str>>(functions: &[S]) -> Result<Self, PatternError> {
        let mut names: Vec<Box<str>> = Vec::with_capacity(functions.len());

        for name in functions {
            let name = name.as_ref().trim();
            if !is_identifier(name) {
                return Err(PatternError::InvalidFunctionName { name: name.to_string() });
            }
            if !names.iter().any(|n| n.as_ref() == name) {
                names.push(name.into());
            }
        }

        if names.is_empty() {
            return Err(PatternError::EmptyFamily);
        }

        let coarse = CoarseFilter::new(&names)?;
        let exact = ExactMatcher::new(&names)?;

        Ok(Self {
            functions: names.into_boxed_slice(),
            coarse,
            exact,
        })
    }

    /// Builds a counter for [`DEFAULT_FUNCTIONS`].
    pub fn with_default_family() -> Result<Self, PatternError> {
        Self::new(DEFAULT_FUNCTIONS)
    }

    /// Returns the configured function names in declaration order.
    #[must_use]
    pub fn functions(&self) -> &[Box<str>] {
        &self.functions
    }

    /// Returns the stage one filter.
    #[must_use]
    pub const fn coarse(&self) -> &CoarseFilter {
        &self.coarse
    }

    /// Returns the stage two matcher.
    #[must_use]
    pub const fn exact(&self) -> &ExactMatcher {
        &self.exact
    }

    /// Counts tokenized calls, skipping the exact stage when the coarse
    /// filter finds no candidate.
    #[must_use]
    pub fn count(&self, content: &str) -> usize {
        if !self.coarse.is_candidate(content) {
            return 0;
        }
        self.exact.count(content)
    }

    /// Counts tokenized calls with the exact stage alone.
    #[must_use]
    pub fn count_exact(&self, content: &str) -> usize {
        self.exact.count(content)
    }

    /// Returns every line containing a tokenized call, in file order.
    #[must_use]
    pub fn find_matches(&self, content: &str) -> Vec<LineMatch> {
        let mut matches: Vec<LineMatch> = Vec::new();

        if !self.coarse.is_candidate(content) {
            return matches;
        }

        let mut line = 1;
        let mut scanned_to = 0;

        for start in self.exact.match_starts(content) {
            line += content.as_bytes()[scanned_to..start]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            scanned_to = start;

            if let Some(last) = matches.last_mut()
                && last.line == line
            {
                last.calls += 1;
                continue;
            }

            let line_start = find_line_start(content, start);
            let line_end = find_line_end(content, start);
            let text = content[line_start..line_end].trim_end_matches('\r');

            matches.push(LineMatch {
                line,
                text: text.to_string(),
                calls: 1,
            });
        }

        matches
    }
}

/// Returns `true` for bytes that may appear inside a C identifier.
pub(crate) const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == b'_')
        && bytes.all(is_ident_byte)
}

/// Whitespace allowed between a function name and `(`: anything except a
/// line break.
pub(crate) fn is_inline_space(c: char) -> bool {
    c.is_whitespace() && c != '\n' && c != '\r'
}

/// Returns `true` if the text at `offset` is optional inline whitespace
/// followed by `(`.
pub(crate) fn follows_open_paren(content: &str, offset: usize) -> bool {
    content[offset..]
        .chars()
        .find(|&c| !is_inline_space(c))
        .is_some_and(|c| c == '(')
}
