use colored::Colorize;
use std::path::Path;

use asyncify_common::{Diagnostic, DiagnosticCategory, LineMap};

/// Formats diagnostics as `file:line:col - category code: message`
/// followed by the offending source line and a `~` underline.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, diagnostics: &[Diagnostic], source: &str) -> String {
        let line_map = LineMap::build(source);
        diagnostics
            .iter()
            .map(|diagnostic| self.format_diagnostic(diagnostic, source, &line_map))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_diagnostic(
        &self,
        diagnostic: &Diagnostic,
        source: &str,
        line_map: &LineMap,
    ) -> String {
        let (line, column) = line_map.offset_to_line_offset(diagnostic.start, source);
        let mut output = format!("{}:{}:{}", diagnostic.file, line, column);
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);
        if let Some(snippet) = self.format_snippet(source, line_map, diagnostic) {
            output.push_str(&snippet);
        }
        output
    }

    /// Banner printed ahead of a converted file when several are printed.
    pub fn format_header(&self, path: &Path) -> String {
        let header = format!("==> {} <==", path.display());
        if self.color {
            header.bold().to_string()
        } else {
            header
        }
    }

    pub fn format_written(&self, path: &Path, functions: usize) -> String {
        let noun = if functions == 1 { "function" } else { "functions" };
        let verb = if self.color {
            "converted".green().to_string()
        } else {
            "converted".to_string()
        };
        format!("{verb} {functions} {noun} in {}", path.display())
    }

    fn format_snippet(
        &self,
        source: &str,
        line_map: &LineMap,
        diagnostic: &Diagnostic,
    ) -> Option<String> {
        if diagnostic.length == 0 {
            return None;
        }
        let (line, column) = line_map.offset_to_line_offset(diagnostic.start, source);
        let line_start = line_map.line_start(line as usize - 1)? as usize;
        let line_text = source.get(line_start..)?.lines().next()?;

        // The underline stops at the end of the first line of the span.
        let width = (diagnostic.length as usize)
            .min(line_text.chars().count().saturating_sub(column as usize - 1))
            .max(1);
        let underline = "~".repeat(width);
        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        let padding = " ".repeat(column as usize - 1);
        Some(format!(
            "\n  {line:>3}   {line_text}\n        {padding}{underline}"
        ))
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("TS{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

#[cfg(test)]
#[path = "tests/reporter_tests.rs"]
mod tests;
