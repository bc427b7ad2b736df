//! Indentation-aware output buffer.

/// Accumulates printed text. Indentation is written lazily at the first
/// write on each line; the first line gets no base indent because edits are
/// spliced in at a position that is already indented.
pub struct SourceWriter {
    output: String,
    indent_level: usize,
    indent_unit: String,
    base_indent: String,
    new_line: String,
    at_line_start: bool,
    on_first_line: bool,
}

impl SourceWriter {
    pub fn new(indent_size: usize, base_indent: &str, new_line: &str) -> SourceWriter {
        SourceWriter {
            output: String::new(),
            indent_level: 0,
            indent_unit: " ".repeat(indent_size),
            base_indent: base_indent.to_string(),
            new_line: new_line.to_string(),
            at_line_start: false,
            on_first_line: true,
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            if !self.on_first_line {
                self.output.push_str(&self.base_indent);
            }
            for _ in 0..self.indent_level {
                self.output.push_str(&self.indent_unit);
            }
            self.at_line_start = false;
        }
        self.output.push_str(text);
        // Verbatim text may carry its own line breaks.
        if memchr::memchr(b'\n', text.as_bytes()).is_some() {
            self.on_first_line = false;
        }
    }

    pub fn write_space(&mut self) {
        self.write(" ");
    }

    pub fn write_line(&mut self) {
        self.output.push_str(&self.new_line);
        self.at_line_start = true;
        self.on_first_line = false;
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.output.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Take the text written so far and reset to a fresh first line.
    pub fn take_output(&mut self) -> String {
        self.at_line_start = false;
        self.on_first_line = true;
        self.indent_level = 0;
        std::mem::take(&mut self.output)
    }
}
