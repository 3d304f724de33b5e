//! Stage two: token-exact call matching.

use regex::Regex;

use super::is_ident_byte;
use crate::error::PatternError;

/// Authoritative matcher for allocation calls.
///
/// Matches a family name followed by inline whitespace and `(`, then
/// rejects any match whose preceding byte is an identifier character.
/// Whitespace excludes `\r` and `\n`, so a match never spans lines.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    regex: Regex,
}

impl ExactMatcher {
    /// Compiles the matcher for the given family names.
    pub fn new(names: &[Box<str>]) -> Result<Self, PatternError> {
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");

        let regex = Regex::new(&format!(r"(?:{alternation})[^\S\r\n]*\("))
            .map_err(|source| PatternError::InvalidRegex { source })?;

        Ok(Self { regex })
    }

    /// Returns the byte offsets at which each tokenized call starts.
    pub fn match_starts<'a>(&'a self, content: &'a str) -> impl Iterator<Item = usize> + 'a {
        let bytes = content.as_bytes();
        self.regex
            .find_iter(content)
            .map(|mat| mat.start())
            .filter(move |&start| start == 0 || !is_ident_byte(bytes[start - 1]))
    }

    /// Counts tokenized calls in `content`.
    #[must_use]
    pub fn count(&self, content: &str) -> usize {
        self.match_starts(content).count()
    }
}
