//! Command-line front end for the asyncify converter.
//!
//! - `args` - clap argument definitions
//! - `driver` - file discovery and parallel per-file conversion
//! - `reporter` - human-readable diagnostic output

pub mod args;
pub mod driver;
pub mod reporter;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::io::Write;
use tracing::info;

use args::CliArgs;
use driver::{Driver, FileOutcome, collect_files};
use reporter::Reporter;

pub const EXIT_SUCCESS: i32 = 0;
/// At least one input did not parse; it was left untouched.
pub const EXIT_PARSE_ERRORS: i32 = 1;

/// Run the CLI against `args`, printing to `out`. Returns the exit status.
pub fn run(args: &CliArgs, out: &mut dyn Write) -> Result<i32> {
    let driver = Driver::from_args(args)?;
    let files = collect_files(&args.files)?;
    info!(files = files.len(), "collected input files");
    let outcomes = driver.process_files(&files)?;

    if args.write && !args.list {
        write_outcomes(&outcomes)?;
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &outcomes).context("failed to write JSON")?;
        writeln!(out)?;
    } else {
        report(args, &outcomes, out)?;
    }

    if outcomes.iter().any(FileOutcome::has_parse_errors) {
        Ok(EXIT_PARSE_ERRORS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Files with parse errors are never written.
fn write_outcomes(outcomes: &[FileOutcome]) -> Result<()> {
    outcomes
        .par_iter()
        .filter(|outcome| outcome.is_changed() && !outcome.has_parse_errors())
        .try_for_each(|outcome| -> Result<()> {
            std::fs::write(&outcome.path, outcome.converted_text())
                .with_context(|| format!("failed to write {}", outcome.path.display()))
        })
}

fn report(args: &CliArgs, outcomes: &[FileOutcome], out: &mut dyn Write) -> Result<()> {
    let reporter = Reporter::new(!args.no_color);
    let with_headers = outcomes.len() > 1;
    for outcome in outcomes {
        if outcome.has_parse_errors() {
            writeln!(out, "{}", reporter.render(&outcome.parse_errors, &outcome.source))?;
            continue;
        }
        if args.list {
            if !outcome.suggestions.is_empty() {
                writeln!(out, "{}", reporter.render(&outcome.suggestions, &outcome.source))?;
            }
            continue;
        }
        if !outcome.is_changed() {
            continue;
        }
        if args.write {
            writeln!(
                out,
                "{}",
                reporter.format_written(&outcome.path, outcome.converted_functions)
            )?;
            continue;
        }
        if with_headers {
            writeln!(out, "{}", reporter.format_header(&outcome.path))?;
        }
        let text = outcome.converted_text();
        write!(out, "{text}")?;
        if !text.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(())
}
