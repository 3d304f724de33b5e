//! Stage one: keyword search that ignores identifier boundaries.

use std::fmt;

use aho_corasick::{AhoCorasick, MatchKind};

use super::follows_open_paren;
use crate::error::PatternError;

/// Cheap, over-inclusive filter for allocation-like call sites.
///
/// Every occurrence of a family name followed by optional inline whitespace
/// and `(` is a hit, even when the name is the tail of a longer identifier
/// (`mymalloc(`). The exact stage rejects those; this stage only has to
/// guarantee it never misses a line the exact stage would count.
pub struct CoarseFilter {
    automaton: AhoCorasick,
}

impl fmt::Debug for CoarseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoarseFilter")
            .field("keywords", &self.automaton.patterns_len())
            .finish()
    }
}

impl CoarseFilter {
    /// Builds the keyword automaton for the given family names.
    pub fn new(names: &[Box<str>]) -> Result<Self, PatternError> {
        // Standard semantics so overlapping names are all reported.
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(names.iter().map(AsRef::as_ref))
            .map_err(|source| PatternError::Automaton { source })?;

        Ok(Self { automaton })
    }

    /// Returns `true` if `content` contains at least one call-shaped hit.
    #[must_use]
    pub fn is_candidate(&self, content: &str) -> bool {
        self.automaton
            .find_overlapping_iter(content)
            .any(|mat| follows_open_paren(content, mat.end()))
    }

    /// Returns the one-based numbers of lines containing a call-shaped hit,
    /// in ascending order without duplicates.
    #[must_use]
    pub fn candidate_lines(&self, content: &str) -> Vec<usize> {
        let mut lines = Vec::new();
        let mut line = 1;
        let mut scanned_to = 0;

        for mat in self.automaton.find_overlapping_iter(content) {
            if !follows_open_paren(content, mat.end()) {
                continue;
            }

            // Overlapping matches can start before the previous one.
            if mat.start() >= scanned_to {
                line += newline_count(&content[scanned_to..mat.start()]);
                scanned_to = mat.start();
            } else {
                line -= newline_count(&content[mat.start()..scanned_to]);
                scanned_to = mat.start();
            }

            if lines.last() != Some(&line) {
                lines.push(line);
            }
        }

        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

fn newline_count(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}
