//! Low-level parsing of BrainVision text lines.
//!
//! Header (`.vhdr`) and marker (`.vmrk`) files share the same INI-like line
//! grammar: blank lines, `;` comments, `[Section]` headers and `key=value`
//! entries. The helpers here classify lines and split field values into
//! tokens so the section parsers only deal with meaning.

use std::io::{self, BufRead};

/// Escape sequence standing for a literal comma inside a field.
const ESCAPED_COMMA: &str = "\\1";

/// Placeholder substituted for [`ESCAPED_COMMA`] while splitting.
const SENTINEL: char = '\u{1}';

/// Classification of a single text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only line
    Blank,
    /// Line starting with `;`
    Comment,
    /// `[Name]` section header, carrying the name between the brackets
    Section(&'a str),
    /// Anything else
    Content(&'a str),
}

/// Strips the line terminator (`\n` or `\r\n`) from a raw line.
#[inline]
pub fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(&['\r', '\n'][..])
}

/// Classifies a line for the key/value parsers.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = strip_eol(line);
    let trimmed = line.trim();

    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with(';') {
        LineKind::Comment
    } else if let Some(rest) = trimmed.strip_prefix('[') {
        LineKind::Section(rest.trim_end_matches(']').trim())
    } else {
        LineKind::Content(trimmed)
    }
}

/// Splits a line once on the first `=` into a trimmed `(key, value)` pair.
///
/// Returns `None` when the line has no `=`.
#[inline]
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    line.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
}

/// Splits a field on `delimiter`, honoring the `\1` escaped-comma convention.
///
/// Each `\1` is swapped for a sentinel before splitting and restored to a
/// literal `,` in every token afterwards, so labels such as `Fp1\1a` survive
/// as `Fp1,a`. Tokens are trimmed; empty tokens between delimiters are kept.
/// Blank input yields no tokens.
pub fn tokenize(field: &str, delimiter: char) -> Vec<String> {
    if field.trim().is_empty() {
        return Vec::new();
    }

    let protected = field.replace(ESCAPED_COMMA, &SENTINEL.to_string());
    protected
        .split(delimiter)
        .map(|token| token.replace(SENTINEL, ",").trim().to_string())
        .collect()
}

/// Returns the token at `index` if present and non-empty.
#[inline]
pub fn token_at(tokens: &[String], index: usize) -> Option<&str> {
    tokens
        .get(index)
        .map(String::as_str)
        .filter(|token| !token.is_empty())
}

/// Feeds every line of `reader` to `f`, decoding invalid UTF-8 lossily.
///
/// BrainVision files written with `Codepage=ANSI` may contain Latin-1 bytes
/// (most often the micro sign in units), which must not abort a parse.
pub fn for_each_line<R: BufRead>(mut reader: R, mut f: impl FnMut(&str)) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        f(strip_eol(&line));
    }
    Ok(())
}
