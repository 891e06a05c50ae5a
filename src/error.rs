//! Comparison errors
//!
//! A mismatch is not an error: it is reported through [`crate::Outcome`].
//! Errors here mean the comparison could not be carried out at all.

use std::fmt;

/// The kind of comparison error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected `regex ` line whose pattern does not compile
    MalformedPattern,
    /// Expected or actual input has no lines
    EmptyInput,
    /// Expected or actual file not found
    FileNotFound,
    /// Invalid usage of the command line
    UsageError,
    /// IO error
    Io,
}

/// A comparison error with file/line context
#[derive(Debug)]
pub struct CompareError {
    pub kind: ErrorKind,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
}

impl CompareError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// Attach a file name, keeping any line number already set.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn malformed_pattern(line: usize, pattern: &str, err: &regex::Error) -> Self {
        let mut e = Self::new(
            ErrorKind::MalformedPattern,
            format!("invalid pattern /{}/: {}", pattern, err),
        );
        e.line = Some(line);
        e
    }

    pub fn empty_input(which: &str) -> Self {
        Self::new(ErrorKind::EmptyInput, format!("{} input has no lines", which))
    }

    pub fn usage(expected: &str) -> Self {
        Self::new(ErrorKind::UsageError, format!("usage: golden-lines {}", expected))
    }

    pub fn is_malformed_pattern(&self) -> bool {
        self.kind == ErrorKind::MalformedPattern
    }

    pub fn is_empty_input(&self) -> bool {
        self.kind == ErrorKind::EmptyInput
    }
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:", file)?;
        }
        if let Some(line) = self.line {
            write!(f, "{}:", line)?;
        }
        if self.file.is_some() || self.line.is_some() {
            write!(f, " ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CompareError {}

impl From<std::io::Error> for CompareError {
    fn from(e: std::io::Error) -> Self {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::FileNotFound
        } else {
            ErrorKind::Io
        };
        Self::new(kind, e.to_string())
    }
}
