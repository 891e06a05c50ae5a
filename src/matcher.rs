//! Line matcher
//!
//! Walks the classified expected lines and the actual lines with two
//! independent cursors. Each step applies the rule for the kind of the
//! current expected line and either advances the cursors or stops with a
//! [`Mismatch`]. There is no backtracking: a repeated block consumes
//! greedily and never gives lines back.

use std::fmt;
use regex::Regex;
use crate::error::CompareError;
use crate::parser::{parse_expected, strip_terminator, ExpectedLine, ParsedLine};

/// Why a comparison failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    /// A literal line differs from the actual line
    LiteralDiffers,
    /// A pattern line does not match the start of the actual line
    PatternNoMatch,
    /// A repeated block matched zero lines
    EmptyRepetition,
    /// A repeated block consumed the rest of the actual output
    UnterminatedBlock,
    /// Actual output ended while expected lines remain
    ActualExhausted,
    /// Expected lines ended while actual output remains
    ExpectedExhausted,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MismatchReason::LiteralDiffers => "literal line differs",
            MismatchReason::PatternNoMatch => "pattern does not match",
            MismatchReason::EmptyRepetition => "repeated block matched no lines",
            MismatchReason::UnterminatedBlock => "repeated block ran past the end of actual output",
            MismatchReason::ActualExhausted => "actual output ended early",
            MismatchReason::ExpectedExhausted => "unexpected extra output",
        };
        f.write_str(s)
    }
}

/// Where and why a comparison failed.
///
/// Line numbers are 1-based source lines; `None` means the cursor had run
/// off the end of that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub reason: MismatchReason,
    pub expected_line: Option<usize>,
    pub actual_line: Option<usize>,
    /// The actual line at the point of failure, without its terminator
    pub actual_text: Option<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.expected_line, self.actual_line) {
            (Some(e), Some(a)) => write!(f, "expected line {}, actual line {}: {}", e, a, self.reason)?,
            (Some(e), None) => write!(f, "expected line {}: {}", e, self.reason)?,
            (None, Some(a)) => write!(f, "actual line {}: {}", a, self.reason)?,
            (None, None) => write!(f, "{}", self.reason)?,
        }
        if let Some(ref text) = self.actual_text {
            write!(f, "\n  got: {:?}", text)?;
        }
        Ok(())
    }
}

/// Result of a full comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    Mismatch(Mismatch),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Outcome::Matched => None,
            Outcome::Mismatch(m) => Some(m),
        }
    }
}

/// Result of consuming a repeated block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockResult {
    /// Cursors after the block: `i` past the block, `j` at the first
    /// non-matching actual line
    Matched { i: usize, j: usize },
    /// `at` is the actual cursor where the block gave up
    Failed { reason: MismatchReason, at: usize },
}

/// Greedily consume actual lines from `j` that match `re`.
fn consume_block<S: AsRef<str>>(re: &Regex, i: usize, mut j: usize, actual: &[S]) -> BlockResult {
    let mut count = 0usize;
    loop {
        let Some(line) = actual.get(j) else {
            return BlockResult::Failed { reason: MismatchReason::UnterminatedBlock, at: j };
        };
        if !re.is_match(strip_terminator(line.as_ref())) {
            break;
        }
        j += 1;
        count += 1;
    }

    tracing::debug!(expected = i, actual = j, count, "repeated block consumed");
    if count == 0 {
        return BlockResult::Failed { reason: MismatchReason::EmptyRepetition, at: j };
    }
    BlockResult::Matched { i: i + 1, j }
}

/// A compiled expected file, reusable across any number of comparisons.
#[derive(Debug, Clone)]
pub struct Matcher {
    expected: Vec<ParsedLine>,
}

impl Matcher {
    /// Classify and compile the expected lines.
    ///
    /// Fails on empty input or on a pattern that does not compile.
    pub fn new<S: AsRef<str>>(expected: &[S]) -> Result<Self, CompareError> {
        if expected.is_empty() {
            return Err(CompareError::empty_input("expected"));
        }
        let expected = parse_expected(expected)?;
        Ok(Self { expected })
    }

    /// The classified expected lines
    pub fn lines(&self) -> &[ParsedLine] {
        &self.expected
    }

    /// Run the comparison against `actual`.
    pub fn check<S: AsRef<str>>(&self, actual: &[S]) -> Result<Outcome, CompareError> {
        if actual.is_empty() {
            return Err(CompareError::empty_input("actual"));
        }

        let expected = &self.expected;
        let (mut i, mut j) = (0usize, 0usize);

        loop {
            let entry = &expected[i];
            let current = actual[j].as_ref();
            tracing::trace!(expected = i, actual = j, kind = entry.line.kind(), "step");

            match &entry.line {
                ExpectedLine::Block(re) => match consume_block(re, i, j, actual) {
                    BlockResult::Matched { i: next_i, j: next_j } => {
                        i = next_i;
                        j = next_j;
                    }
                    BlockResult::Failed { reason, at } => {
                        let text = actual.get(at).map(|l| strip_terminator(l.as_ref()).to_string());
                        return Ok(self.fail(reason, Some(i), text.as_ref().map(|_| at), text));
                    }
                },
                ExpectedLine::Pattern(re) => {
                    if !re.is_match(strip_terminator(current)) {
                        return Ok(self.fail(
                            MismatchReason::PatternNoMatch,
                            Some(i),
                            Some(j),
                            Some(strip_terminator(current).to_string()),
                        ));
                    }
                    i += 1;
                    j += 1;
                }
                ExpectedLine::Literal(text) => {
                    if text != current {
                        return Ok(self.fail(
                            MismatchReason::LiteralDiffers,
                            Some(i),
                            Some(j),
                            Some(strip_terminator(current).to_string()),
                        ));
                    }
                    i += 1;
                    j += 1;
                }
            }

            if i >= expected.len() || j >= actual.len() {
                break;
            }
        }

        if i == expected.len() && j == actual.len() {
            return Ok(Outcome::Matched);
        }
        if i < expected.len() {
            Ok(self.fail(MismatchReason::ActualExhausted, Some(i), None, None))
        } else {
            let text = strip_terminator(actual[j].as_ref()).to_string();
            Ok(self.fail(MismatchReason::ExpectedExhausted, None, Some(j), Some(text)))
        }
    }

    fn fail(
        &self,
        reason: MismatchReason,
        expected_idx: Option<usize>,
        actual_idx: Option<usize>,
        actual_text: Option<String>,
    ) -> Outcome {
        let mismatch = Mismatch {
            reason,
            expected_line: expected_idx.map(|i| self.expected[i].line_number),
            actual_line: actual_idx.map(|j| j + 1),
            actual_text,
        };
        tracing::debug!(%mismatch, "comparison failed");
        Outcome::Mismatch(mismatch)
    }
}

/// Compare expected lines against actual lines.
///
/// Returns `Ok(true)` only when both sequences are consumed together.
/// Errors are reserved for inputs that cannot be compared at all.
pub fn compare<E: AsRef<str>, A: AsRef<str>>(expected: &[E], actual: &[A]) -> Result<bool, CompareError> {
    Ok(Matcher::new(expected)?.check(actual)?.is_match())
}
