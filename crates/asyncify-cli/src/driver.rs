//! File discovery and per-file conversion.
//!
//! Every file is parsed, bound and converted on its own; files are
//! processed in parallel and share nothing but the read-only options.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};
use walkdir::{DirEntry, WalkDir};

use asyncify_checker::OracleOptions;
use asyncify_common::{Diagnostic, LineMap};
use asyncify_emitter::PrintOptions;
use asyncify_lsp::{ConvertToAsyncCodeFix, ParsedSource, TextEdit, apply_text_changes};

use crate::args::{CliArgs, Target};

/// Extensions picked up when walking a directory.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

pub fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

/// Expand `inputs` into a sorted, deduplicated list of files. Explicit file
/// arguments are kept whatever their extension.
pub fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_entry(|entry| !is_skipped_dir(entry))
            {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", input.display()))?;
                if entry.file_type().is_file() && is_source_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("{} does not exist", input.display());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// What happened to one file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(skip)]
    pub source: String,
    pub parse_errors: Vec<Diagnostic>,
    pub suggestions: Vec<Diagnostic>,
    pub edits: Vec<TextEdit>,
    /// Number of functions the edits convert.
    pub converted_functions: usize,
}

impl FileOutcome {
    pub fn has_parse_errors(&self) -> bool {
        !self.parse_errors.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn converted_text(&self) -> String {
        apply_text_changes(&self.source, &self.edits)
    }
}

pub struct Driver {
    fix: ConvertToAsyncCodeFix,
    target: Target,
    list_only: bool,
}

impl Driver {
    pub fn new(fix: ConvertToAsyncCodeFix, target: Target, list_only: bool) -> Driver {
        Driver {
            fix,
            target,
            list_only,
        }
    }

    pub fn from_args(args: &CliArgs) -> Result<Driver> {
        let oracle_options = match &args.config {
            Some(path) => OracleOptions::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => OracleOptions::default(),
        };
        let print_options = PrintOptions {
            indent_size: args.indent,
            ..PrintOptions::default()
        };
        Ok(Driver::new(
            ConvertToAsyncCodeFix::new(oracle_options, print_options),
            args.target(),
            args.list,
        ))
    }

    pub fn process_files(&self, paths: &[PathBuf]) -> Result<Vec<FileOutcome>> {
        paths.par_iter().map(|path| self.process_file(path)).collect()
    }

    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(self.convert_source(path, source))
    }

    /// Suggestions and edits for one file. A file that does not parse gets
    /// its parse errors and nothing else.
    pub fn convert_source(&self, path: &Path, source: String) -> FileOutcome {
        let file_name = path.display().to_string();
        let _span = info_span!("convert_file", file = %file_name).entered();

        let parsed = ParsedSource::parse(&file_name, &source);
        let parse_errors: Vec<Diagnostic> = parsed
            .parse_diagnostics
            .iter()
            .map(|d| Diagnostic::error(&file_name, d.start, d.length, &d.message, d.code))
            .collect();
        if !parse_errors.is_empty() {
            debug!(count = parse_errors.len(), "skipping file with parse errors");
            return FileOutcome {
                path: path.to_path_buf(),
                source,
                parse_errors,
                suggestions: Vec::new(),
                edits: Vec::new(),
                converted_functions: 0,
            };
        }

        let suggestions = self.fix.get_suggestions(&file_name, &source);
        let (edits, converted_functions) = if self.list_only {
            (Vec::new(), 0)
        } else {
            self.edits_for(&file_name, &source)
        };
        debug!(
            suggestions = suggestions.len(),
            converted_functions, "converted file"
        );
        FileOutcome {
            path: path.to_path_buf(),
            source,
            parse_errors,
            suggestions,
            edits,
            converted_functions,
        }
    }

    fn edits_for(&self, file_name: &str, source: &str) -> (Vec<TextEdit>, usize) {
        let edits = match &self.target {
            Target::Position(position) => self.fix.conversion_at(file_name, source, *position),
            Target::LineColumn { line, column } => LineMap::build(source)
                .line_offset_to_offset(*line, *column, source)
                .map(|position| self.fix.conversion_at(file_name, source, position))
                .unwrap_or_default(),
            Target::Function(name) => self.fix.conversion_named(file_name, source, name),
            Target::All => {
                let conversions = self.fix.all_conversions(file_name, source);
                let count = conversions.len();
                let edits = conversions.iter().flat_map(|c| c.edits()).collect();
                return (edits, count);
            }
        };
        let count = usize::from(!edits.is_empty());
        (edits, count)
    }
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
