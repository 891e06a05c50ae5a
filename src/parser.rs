//! Expected-file parser
//!
//! Classifies each expected line before matching starts:
//! - `regex info` immediately followed by a `regex <pattern>` line is a
//!   repeated block; the pair collapses into one [`ExpectedLine::Block`]
//! - `regex <pattern>` is a single-line [`ExpectedLine::Pattern`]
//! - anything else is an [`ExpectedLine::Literal`], compared byte for byte
//!
//! Patterns are anchored at the start of the actual line but need not
//! consume all of it.

use regex::Regex;
use crate::error::CompareError;

/// Prefix that turns an expected line into a pattern line
pub const PATTERN_PREFIX: &str = "regex ";

/// Marker line that opens a repeated block
pub const BLOCK_MARKER: &str = "regex info";

/// One classified expected line
#[derive(Debug, Clone)]
pub enum ExpectedLine {
    /// Must equal the actual line exactly, terminator included
    Literal(String),
    /// Must match the start of exactly one actual line
    Pattern(Regex),
    /// Must match the start of one or more consecutive actual lines
    Block(Regex),
}

impl ExpectedLine {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ExpectedLine::Literal(_) => "literal",
            ExpectedLine::Pattern(_) => "pattern",
            ExpectedLine::Block(_) => "block",
        }
    }
}

/// A classified line together with its 1-based position in the source file.
///
/// For a block, `line_number` is the `regex info` marker line.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    pub line: ExpectedLine,
    pub line_number: usize,
}

/// Split text into newline-inclusive lines.
///
/// CRLF is normalized to LF first so both sides of a comparison agree.
/// A final line without a terminator is kept as is.
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized.split_inclusive('\n').map(str::to_string).collect()
}

/// Strip a single trailing `\n` (or `\r\n`) from a line
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Pattern text of a `regex ` line, or `None` for any other line.
///
/// The pattern is everything after the first `regex `, without the
/// line terminator.
pub fn pattern_text(line: &str) -> Option<&str> {
    strip_terminator(line).strip_prefix(PATTERN_PREFIX)
}

fn is_block_marker(line: &str) -> bool {
    strip_terminator(line) == BLOCK_MARKER
}

/// Compile a pattern anchored at the start of the target text, with a size
/// limit to mitigate ReDoS (CWE-1333).
///
/// The raw pattern must compile on its own first: wrapping unbalanced text
/// like `x)|(y` would otherwise yield a valid but unanchored alternation.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    build_limited(pattern)?;
    build_limited(&format!("^(?:{})", pattern))
}

fn build_limited(pattern: &str) -> Result<Regex, regex::Error> {
    regex::RegexBuilder::new(pattern)
        .size_limit(1 << 20) // 1 MB DFA limit
        .build()
}

fn compile_at(pattern: &str, line_number: usize) -> Result<Regex, CompareError> {
    compile_pattern(pattern).map_err(|e| CompareError::malformed_pattern(line_number, pattern, &e))
}

/// Classify all expected lines.
///
/// Every pattern is compiled here, so a malformed pattern is reported with
/// its line number before any comparison runs.
pub fn parse_expected<S: AsRef<str>>(lines: &[S]) -> Result<Vec<ParsedLine>, CompareError> {
    let mut parsed = Vec::with_capacity(lines.len());
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx].as_ref();
        let line_number = idx + 1;

        if is_block_marker(line) {
            if let Some(next) = lines.get(idx + 1).and_then(|l| pattern_text(l.as_ref())) {
                let re = compile_at(next, line_number + 1)?;
                parsed.push(ParsedLine { line: ExpectedLine::Block(re), line_number });
                idx += 2;
                continue;
            }
        }

        let kind = match pattern_text(line) {
            Some(pattern) => ExpectedLine::Pattern(compile_at(pattern, line_number)?),
            None => ExpectedLine::Literal(line.to_string()),
        };
        parsed.push(ParsedLine { line: kind, line_number });
        idx += 1;
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(parsed: &[ParsedLine]) -> Vec<&'static str> {
        parsed.iter().map(|p| p.line.kind()).collect()
    }

    #[test]
    fn test_split_lines_keeps_terminators() {
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_split_lines_normalizes_crlf() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a\n", "b\n"]);
    }

    #[test]
    fn test_pattern_text() {
        assert_eq!(pattern_text("regex ^OK\n"), Some("^OK"));
        assert_eq!(pattern_text("regex a regex b"), Some("a regex b"));
        assert_eq!(pattern_text("regexp ^OK"), None);
        assert_eq!(pattern_text(" regex ^OK"), None);
    }

    #[test]
    fn test_parse_literal_and_pattern() {
        let parsed = parse_expected(&["hello\n", "regex ^wor\n"]).unwrap();
        assert_eq!(kinds(&parsed), vec!["literal", "pattern"]);
        assert_eq!(parsed[1].line_number, 2);
        match &parsed[0].line {
            ExpectedLine::Literal(text) => assert_eq!(text, "hello\n"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_block_collapses_pair() {
        let parsed = parse_expected(&["regex info\n", "regex ^x\n", "done\n"]).unwrap();
        assert_eq!(kinds(&parsed), vec!["block", "literal"]);
        assert_eq!(parsed[0].line_number, 1);
        assert_eq!(parsed[1].line_number, 3);
    }

    #[test]
    fn test_parse_marker_without_pattern_is_pattern() {
        let parsed = parse_expected(&["regex info\n", "done\n"]).unwrap();
        assert_eq!(kinds(&parsed), vec!["pattern", "literal"]);

        let parsed = parse_expected(&["regex info"]).unwrap();
        assert_eq!(kinds(&parsed), vec!["pattern"]);
    }

    #[test]
    fn test_parse_marker_with_suffix_is_pattern() {
        let parsed = parse_expected(&["regex info depth \\d+\n", "regex ^x\n"]).unwrap();
        assert_eq!(kinds(&parsed), vec!["pattern", "pattern"]);
    }

    #[test]
    fn test_pattern_is_start_anchored() {
        let re = compile_pattern("OK").unwrap();
        assert!(re.is_match("OK extra"));
        assert!(!re.is_match("not OK"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let re = compile_pattern("a|b").unwrap();
        assert!(re.is_match("b1"));
        assert!(!re.is_match("cb"));
    }

    #[test]
    fn test_unbalanced_group_is_malformed() {
        assert!(compile_pattern("x)|(y").is_err());
        let err = parse_expected(&["regex x)|(y\n"]).unwrap_err();
        assert!(err.is_malformed_pattern());
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_malformed_pattern_reports_line() {
        let err = parse_expected(&["ok\n", "regex (unclosed\n"]).unwrap_err();
        assert!(err.is_malformed_pattern());
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_malformed_block_pattern_reports_pattern_line() {
        let err = parse_expected(&["regex info\n", "regex [\n"]).unwrap_err();
        assert_eq!(err.line, Some(2));
    }
}
