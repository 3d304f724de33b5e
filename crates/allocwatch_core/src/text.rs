//! Source text decoding and line boundary helpers.

use std::borrow::Cow;
use std::fmt;

/// Number of leading bytes inspected for NUL when detecting binary content.
/// Same heuristic git uses for its own binary detection.
const BINARY_CHECK_BYTES: usize = 8000;

/// Why a blob was not decoded as source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The blob contains a NUL byte near its start.
    Binary,
    /// The blob is larger than the configured limit.
    TooLarge {
        /// Blob size in bytes.
        size: u64,
        /// The configured limit in bytes.
        limit: u64,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary content"),
            Self::TooLarge { size, limit } => write!(f, "{size} bytes exceeds limit of {limit} bytes"),
        }
    }
}

/// Decodes a blob as source text.
///
/// Invalid UTF-8 is replaced rather than rejected so that ASCII call sites
/// in legacy-encoded files still count.
pub fn decode_source(bytes: &[u8], max_bytes: Option<u64>) -> Result<Cow<'_, str>, SkipReason> {
    let size = bytes.len() as u64;
    if let Some(limit) = max_bytes
        && size > limit
    {
        return Err(SkipReason::TooLarge { size, limit });
    }

    if is_binary(bytes) {
        return Err(SkipReason::Binary);
    }

    Ok(String::from_utf8_lossy(bytes))
}

/// Returns `true` if the first [`BINARY_CHECK_BYTES`] of `bytes` contain a
/// NUL byte.
#[must_use]
pub fn is_binary(bytes: &[u8]) -> bool {
    let check_len = bytes.len().min(BINARY_CHECK_BYTES);
    bytes[..check_len].contains(&0)
}

/// Returns the byte offset of the start of the line containing `offset`.
#[must_use]
pub fn find_line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Returns the byte offset of the next newline at or after `offset`, or the
/// end of `content` when the last line is unterminated.
#[must_use]
pub fn find_line_end(content: &str, offset: usize) -> usize {
    content[offset..].find('\n').map_or(content.len(), |i| offset + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_source_passes_plain_text_through() {
        let decoded = decode_source(b"int *p = malloc(4);\n", None).unwrap();
        assert_eq!(decoded, "int *p = malloc(4);\n");
    }

    #[test]
    fn decode_source_replaces_invalid_utf8() {
        let decoded = decode_source(b"/* caf\xe9 */ malloc(1);", None).unwrap();
        assert!(decoded.contains("malloc(1);"));
        assert!(decoded.contains('\u{FFFD}'));
    }

    #[test]
    fn decode_source_rejects_binary() {
        assert_eq!(decode_source(b"\x7fELF\0\0\0", None), Err(SkipReason::Binary));
    }

    #[test]
    fn decode_source_ignores_nul_after_check_window() {
        let mut bytes = vec![b'a'; BINARY_CHECK_BYTES];
        bytes.push(0);
        assert!(decode_source(&bytes, None).is_ok());
    }

    #[test]
    fn decode_source_enforces_size_limit() {
        assert_eq!(
            decode_source(b"0123456789", Some(4)),
            Err(SkipReason::TooLarge { size: 10, limit: 4 })
        );
        assert!(decode_source(b"0123", Some(4)).is_ok());
    }

    #[test]
    fn skip_reason_display_is_readable() {
        assert_eq!(SkipReason::Binary.to_string(), "binary content");
        assert_eq!(
            SkipReason::TooLarge { size: 10, limit: 4 }.to_string(),
            "10 bytes exceeds limit of 4 bytes"
        );
    }

    #[test]
    fn line_bounds_on_middle_line() {
        let content = "one\ntwo malloc(1)\nthree";
        let offset = content.find("malloc").unwrap();
        assert_eq!(&content[find_line_start(content, offset)..find_line_end(content, offset)], "two malloc(1)");
    }

    #[test]
    fn line_bounds_on_unterminated_last_line() {
        let content = "one\nlast";
        assert_eq!(find_line_start(content, 6), 4);
        assert_eq!(find_line_end(content, 6), 8);
    }

    #[test]
    fn line_bounds_on_empty_content() {
        assert_eq!(find_line_start("", 0), 0);
        assert_eq!(find_line_end("", 0), 0);
    }
}
