//! Case runner
//!
//! A case is a pair of files sharing a name inside one directory:
//! `<dir>/<name>.txt` holds the expected lines and `<dir>/<name>.tmp`
//! the actual output. The runner resolves those paths, runs the matcher,
//! and collects per-case results with a log for reporting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use similar::TextDiff;
use crate::error::CompareError;
use crate::matcher::{Matcher, Mismatch, Outcome};
use crate::parser::split_lines;

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding the case files
    pub dir: PathBuf,
    /// Only discover cases whose name contains this
    pub filter: Option<String>,
    /// Keep the full per-case log on success too
    pub verbose: bool,
    /// Render a unified diff into the log on mismatch
    pub diff: bool,
    /// Extension of expected files
    pub expected_ext: String,
    /// Extension of actual files
    pub actual_ext: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            filter: None,
            verbose: false,
            diff: true,
            expected_ext: ".txt".into(),
            actual_ext: ".tmp".into(),
        }
    }
}

/// Result of running a set of cases
#[derive(Debug)]
pub struct SuiteResult {
    /// Individual case results
    pub cases: Vec<CaseResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResult {
    /// Check if all cases passed
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }

    /// Count passed cases
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    /// Count cases that compared and did not match
    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|c| !c.passed && c.error.is_none()).count()
    }

    /// Count cases that could not be compared at all
    pub fn errored_count(&self) -> usize {
        self.cases.iter().filter(|c| c.error.is_some()).count()
    }

    /// Format a summary line
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} errors ({}ms)",
            self.passed_count(),
            self.failed_count(),
            self.errored_count(),
            self.duration.as_millis(),
        )
    }
}

/// Result of a single case
#[derive(Debug)]
pub struct CaseResult {
    /// Case name (file stem shared by both files)
    pub name: String,
    /// Expected file path
    pub expected: PathBuf,
    /// Actual file path
    pub actual: PathBuf,
    /// Whether the actual output matched
    pub passed: bool,
    /// Where the comparison failed, if it ran and did not match
    pub mismatch: Option<Mismatch>,
    /// Error message if the comparison could not run
    pub error: Option<String>,
    /// Execution log
    pub log: String,
    /// Duration
    pub duration: Duration,
}

/// Runs cases from one directory
pub struct Suite {
    config: RunConfig,
}

impl Suite {
    /// Create a new suite with the given config
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Path of the expected file for `name`
    pub fn expected_path(&self, name: &str) -> PathBuf {
        self.config.dir.join(format!("{}{}", name, self.config.expected_ext))
    }

    /// Path of the actual file for `name`
    pub fn actual_path(&self, name: &str) -> PathBuf {
        self.config.dir.join(format!("{}{}", name, self.config.actual_ext))
    }

    /// Discover case names: every expected file with a sibling actual file.
    pub fn discover(&self) -> Result<Vec<String>, std::io::Error> {
        let dir = &self.config.dir;
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("case directory not found: {}", dir.display()),
            ));
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(name) = file_name.strip_suffix(self.config.expected_ext.as_str()) else {
                continue;
            };
            if name.is_empty() || !self.actual_path(name).is_file() {
                continue;
            }
            if let Some(ref filter) = self.config.filter {
                if !name.contains(filter.as_str()) {
                    continue;
                }
            }
            names.push(name.to_string());
        }

        names.sort();
        Ok(names)
    }

    /// Count the number of cases that would be run
    pub fn count_cases(&self) -> Result<usize, std::io::Error> {
        Ok(self.discover()?.len())
    }

    /// Compare one named case and return the verdict.
    pub fn compare(&self, name: &str) -> Result<bool, CompareError> {
        compare_files(self.expected_path(name), self.actual_path(name)).map(|o| o.is_match())
    }

    /// Run all discovered cases
    pub fn run_all(&self) -> Result<SuiteResult, std::io::Error> {
        let names = self.discover()?;
        Ok(self.run_named(&names))
    }

    /// Run the given cases in order
    pub fn run_named<S: AsRef<str>>(&self, names: &[S]) -> SuiteResult {
        let start = Instant::now();
        let cases = names.iter().map(|n| self.run_one(n.as_ref())).collect();
        SuiteResult {
            cases,
            duration: start.elapsed(),
        }
    }

    /// Run a single case
    pub fn run_one(&self, name: &str) -> CaseResult {
        let start = Instant::now();
        let expected = self.expected_path(name);
        let actual = self.actual_path(name);
        let mut log = String::new();

        let (passed, mismatch, error) = match self.execute_case(&expected, &actual, &mut log) {
            Ok(Outcome::Matched) => (true, None, None),
            Ok(Outcome::Mismatch(m)) => (false, Some(m), None),
            Err(e) => {
                logf(&mut log, &format!("[error: {}]", e));
                (false, None, Some(e.to_string()))
            }
        };
        tracing::debug!(case = name, passed, "case finished");

        CaseResult {
            name: name.to_string(),
            expected,
            actual,
            passed,
            mismatch,
            error,
            log,
            duration: start.elapsed(),
        }
    }

    /// Read both files, compare, and log what happened.
    fn execute_case(&self, expected: &Path, actual: &Path, log: &mut String) -> Result<Outcome, CompareError> {
        let expected_text = read_text(expected)?;
        let actual_text = read_text(actual)?;
        let expected_lines = split_lines(&expected_text);
        let actual_lines = split_lines(&actual_text);
        logf(log, &format!("> expected {} ({} lines)", expected.display(), expected_lines.len()));
        logf(log, &format!("> actual {} ({} lines)", actual.display(), actual_lines.len()));

        let outcome = compare_lines(expected, &expected_lines, actual, &actual_lines)?;
        match outcome {
            Outcome::Matched => {
                if self.config.verbose {
                    logf(log, "[match]");
                }
            }
            Outcome::Mismatch(ref m) => {
                logf(log, &format!("[mismatch: {}]", m));
                if self.config.diff {
                    logf(log, &render_diff(expected, &expected_text, actual, &actual_text));
                }
            }
        }
        Ok(outcome)
    }
}

fn compare_lines(
    expected: &Path,
    expected_lines: &[String],
    actual: &Path,
    actual_lines: &[String],
) -> Result<Outcome, CompareError> {
    let matcher = Matcher::new(expected_lines)
        .map_err(|e| e.with_file(expected.display().to_string()))?;
    matcher.check(actual_lines)
        .map_err(|e| e.with_file(actual.display().to_string()))
}

/// Compare an expected file against an actual file.
pub fn compare_files(expected: impl AsRef<Path>, actual: impl AsRef<Path>) -> Result<Outcome, CompareError> {
    let (expected, actual) = (expected.as_ref(), actual.as_ref());
    let expected_lines = load_lines(expected)?;
    let actual_lines = load_lines(actual)?;
    compare_lines(expected, &expected_lines, actual, &actual_lines)
}

/// Read a file into newline-inclusive lines.
pub fn load_lines(path: impl AsRef<Path>) -> Result<Vec<String>, CompareError> {
    Ok(split_lines(&read_text(path.as_ref())?))
}

fn read_text(path: &Path) -> Result<String, CompareError> {
    std::fs::read_to_string(path).map_err(|e| {
        let mut err = CompareError::from(e);
        err.message = format!("{}: {}", path.display(), err.message);
        err
    })
}

/// Unified diff of the two files, for humans reading a failure.
fn render_diff(expected: &Path, expected_text: &str, actual: &Path, actual_text: &str) -> String {
    let expected_text = expected_text.replace("\r\n", "\n");
    let actual_text = actual_text.replace("\r\n", "\n");
    let diff = TextDiff::from_lines(&expected_text, &actual_text);
    let expected_name = expected.display().to_string();
    let actual_name = actual.display().to_string();
    diff.unified_diff()
        .header(&expected_name, &actual_name)
        .to_string()
}

/// Append a log entry
fn logf(log: &mut String, msg: &str) {
    log.push_str(msg);
    if !msg.ends_with('\n') {
        log.push('\n');
    }
}

/// Builder API for convenient suite construction
pub struct SuiteBuilder {
    config: RunConfig,
}

impl SuiteBuilder {
    /// Start building a suite for the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            config: RunConfig {
                dir: dir.into(),
                ..Default::default()
            },
        }
    }

    /// Set the case name filter
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.config.filter = Some(filter.into());
        self
    }

    /// Enable verbose logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Enable or disable diff rendering on mismatch
    pub fn diff(mut self, diff: bool) -> Self {
        self.config.diff = diff;
        self
    }

    /// Set the expected and actual file extensions
    pub fn extensions(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.config.expected_ext = expected.into();
        self.config.actual_ext = actual.into();
        self
    }

    /// Build and return the suite
    pub fn build(self) -> Suite {
        Suite::new(self.config)
    }

    /// Build and run all discovered cases
    pub fn run(self) -> Result<SuiteResult, std::io::Error> {
        self.build().run_all()
    }
}

/// Convenience function: create a suite builder for a directory
pub fn run(dir: impl Into<PathBuf>) -> SuiteBuilder {
    SuiteBuilder::new(dir)
}

/// Run every case in `dir` and integrate with `#[test]` by panicking on failure.
///
/// Usage in cargo tests:
/// ```rust,ignore
/// #[test]
/// fn golden_outputs() {
///     golden_lines::run_and_assert("tests/golden");
/// }
/// ```
pub fn run_and_assert(dir: impl Into<PathBuf>) {
    let config = RunConfig {
        dir: dir.into(),
        verbose: std::env::var("GOLDEN_VERBOSE").is_ok(),
        ..Default::default()
    };

    let suite = Suite::new(config);
    let result = suite.run_all().expect("failed to discover cases");

    for case in &result.cases {
        if case.passed {
            eprintln!("PASS  {} ({}ms)", case.name, case.duration.as_millis());
        } else {
            eprintln!("FAIL  {}", case.name);
            for line in case.log.lines() {
                eprintln!("  {}", line);
            }
        }
    }

    eprintln!("\n{}", result.summary());

    if !result.all_passed() {
        panic!("{} case(s) failed", result.failed_count() + result.errored_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn write_case(dir: &Path, name: &str, expected: &str, actual: &str) {
        std::fs::write(dir.join(format!("{}.txt", name)), expected).unwrap();
        std::fs::write(dir.join(format!("{}.tmp", name)), actual).unwrap();
    }

    fn suite(dir: &Path) -> Suite {
        run(dir).build()
    }

    #[test]
    fn test_paths_follow_naming_convention() {
        let suite = Suite::new(RunConfig::default());
        assert_eq!(suite.expected_path("perft"), PathBuf::from("output/perft.txt"));
        assert_eq!(suite.actual_path("perft"), PathBuf::from("output/perft.tmp"));
    }

    #[test]
    fn test_compare_named_case() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "ok", "a\nregex ^b\n", "a\nbee\n");
        write_case(tmp.path(), "bad", "a\n", "z\n");
        let suite = suite(tmp.path());
        assert!(suite.compare("ok").unwrap());
        assert!(!suite.compare("bad").unwrap());
    }

    #[test]
    fn test_missing_actual_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("lonely.txt"), "a\n").unwrap();
        let err = suite(tmp.path()).compare("lonely").unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotFound);
        assert!(err.message.contains("lonely.tmp"), "{}", err.message);
    }

    #[test]
    fn test_empty_actual_is_error_with_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "empty", "a\n", "");
        let err = suite(tmp.path()).compare("empty").unwrap_err();
        assert!(err.is_empty_input());
        assert!(err.file.as_deref().unwrap().ends_with("empty.tmp"));
    }

    #[test]
    fn test_malformed_pattern_names_expected_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "broken", "ok\nregex (\n", "ok\nx\n");
        let err = suite(tmp.path()).compare("broken").unwrap_err();
        assert!(err.is_malformed_pattern());
        let text = err.to_string();
        assert!(text.contains("broken.txt:2:"), "{}", text);
    }

    #[test]
    fn test_discover_pairs_only() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "b", "x\n", "x\n");
        write_case(tmp.path(), "a", "x\n", "x\n");
        std::fs::write(tmp.path().join("orphan.txt"), "x\n").unwrap();
        std::fs::write(tmp.path().join("stray.tmp"), "x\n").unwrap();
        assert_eq!(suite(tmp.path()).discover().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_discover_filter() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "uci_go", "x\n", "x\n");
        write_case(tmp.path(), "perft", "x\n", "x\n");
        let suite = run(tmp.path()).filter("uci").build();
        assert_eq!(suite.discover().unwrap(), vec!["uci_go"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let suite = suite(&tmp.path().join("nope"));
        assert!(suite.discover().is_err());
    }

    #[test]
    fn test_run_all_counts() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "pass", "a\n", "a\n");
        write_case(tmp.path(), "fail", "a\n", "b\n");
        write_case(tmp.path(), "error", "regex [\n", "b\n");
        let result = suite(tmp.path()).run_all().unwrap();
        assert_eq!(result.cases.len(), 3);
        assert_eq!(result.passed_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.errored_count(), 1);
        assert!(!result.all_passed());
        assert!(result.summary().starts_with("1 passed, 1 failed, 1 errors"));
    }

    #[test]
    fn test_mismatch_log_has_diff() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "moves", "e2e4 e7e5\n", "e2e4 c7c5\n");
        let case = suite(tmp.path()).run_one("moves");
        assert!(!case.passed);
        assert!(case.mismatch.is_some());
        assert!(case.log.contains("[mismatch: expected line 1, actual line 1"));
        assert!(case.log.contains("-e2e4 e7e5"));
        assert!(case.log.contains("+e2e4 c7c5"));
    }

    #[test]
    fn test_no_diff_when_disabled() {
        let tmp = tempfile::tempdir().unwrap();
        write_case(tmp.path(), "moves", "e2e4\n", "d2d4\n");
        let case = run(tmp.path()).diff(false).build().run_one("moves");
        assert!(!case.log.contains("+d2d4"));
    }

    #[test]
    fn test_custom_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("g.golden"), "x\n").unwrap();
        std::fs::write(tmp.path().join("g.out"), "x\n").unwrap();
        let suite = run(tmp.path()).extensions(".golden", ".out").build();
        assert_eq!(suite.discover().unwrap(), vec!["g"]);
        assert!(suite.compare("g").unwrap());
    }
}
