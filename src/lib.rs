//! golden-lines: line-oriented golden output matching
//!
//! Checks that an actual output matches an expected ("golden") output line by
//! line. The expected side may carry pattern directives, so outputs with
//! varying numbers, timings, or search depths can still be pinned down.
//!
//! # Expected-file format
//!
//! ```text
//! id name Engine
//! regex ^id author .+
//! uciok
//! regex info
//! regex ^info depth \d+
//! regex ^bestmove [a-h][1-8][a-h][1-8]
//! ```
//!
//! | Line | Meaning |
//! |------|---------|
//! | `regex info` + `regex <pattern>` | One or more consecutive actual lines matching `<pattern>` |
//! | `regex <pattern>` | Exactly one actual line whose start matches `<pattern>` |
//! | anything else | Exactly one actual line, byte for byte |
//!
//! Matching is strict and single-pass: both files must be consumed together,
//! and a repeated block consumes greedily without backtracking.
//!
//! # Cases
//!
//! A case named `perft` lives in two files, `output/perft.txt` (expected) and
//! `output/perft.tmp` (actual). See [`Suite`] and the `golden-lines` binary.

mod error;
mod matcher;
mod parser;
mod runner;

pub use error::{CompareError, ErrorKind};
pub use matcher::{compare, Matcher, Mismatch, MismatchReason, Outcome};
pub use parser::{parse_expected, split_lines, ExpectedLine, ParsedLine, BLOCK_MARKER, PATTERN_PREFIX};
pub use runner::{compare_files, load_lines, CaseResult, RunConfig, Suite, SuiteBuilder, SuiteResult};

// Convenience functions for cargo test integration
pub use runner::{run, run_and_assert};
