//! golden-lines CLI
//!
//! Compare `<dir>/<name>.tmp` against `<dir>/<name>.txt`.
//! Exit status: 0 when every case matches, 1 on a mismatch, 2 when a case
//! could not be compared.

use anyhow::Context;
use clap::Parser;
use golden_lines::{RunConfig, Suite, SuiteResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_MISMATCH: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "golden-lines")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Compare actual output files against golden expected files")]
struct Cli {
    /// Case names to compare (NAME.txt against NAME.tmp)
    names: Vec<String>,

    /// Directory holding the case files
    #[arg(short, long, default_value = "output")]
    dir: PathBuf,

    /// Compare every case discovered in the directory
    #[arg(short, long)]
    all: bool,

    /// With --all, only run cases whose name contains this string
    #[arg(short = 'f', long, requires = "all")]
    filter: Option<String>,

    /// Verbose output: show the per-case log and debug diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Do not render a diff on mismatch
    #[arg(long = "no-diff")]
    no_diff: bool,

    /// Show number of discovered cases without running
    #[arg(long = "count")]
    count: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = RunConfig {
        dir: cli.dir.clone(),
        filter: cli.filter.clone(),
        verbose: cli.verbose,
        diff: !cli.no_diff,
        ..Default::default()
    };
    let suite = Suite::new(config);

    if cli.count {
        let count = suite.count_cases()
            .with_context(|| format!("discovering cases in {}", cli.dir.display()))?;
        println!("Found {} case(s)", count);
        return Ok(ExitCode::SUCCESS);
    }

    let result = if cli.all {
        suite.run_all()
            .with_context(|| format!("discovering cases in {}", cli.dir.display()))?
    } else if cli.names.is_empty() {
        return Err(golden_lines::CompareError::usage("[--dir DIR] NAME... | --all").into());
    } else {
        suite.run_named(&cli.names)
    };

    print_results(&result, cli.verbose);

    Ok(if result.errored_count() > 0 {
        ExitCode::from(EXIT_ERROR)
    } else if result.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_MISMATCH)
    })
}

fn print_results(result: &SuiteResult, verbose: bool) {
    for case in &result.cases {
        if case.passed {
            println!("PASS  {} ({}ms)", case.name, case.duration.as_millis());
            if verbose && !case.log.is_empty() {
                for line in case.log.lines() {
                    println!("      {}", line);
                }
            }
        } else {
            println!("FAIL  {}", case.name);
            if !case.log.is_empty() {
                println!("      --- log ---");
                for line in case.log.lines() {
                    println!("      {}", line);
                }
            }
        }
    }

    if result.cases.len() > 1 {
        println!();
        println!("{}", result.summary());
    }
}
