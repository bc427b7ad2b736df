//! Position and location utilities.
//!
//! The AST stores byte offsets, editors talk in line/column pairs. This
//! module converts between the two, both for 0-based LSP positions and for
//! the 1-based `line`/`offset` pairs used by code-fix text changes.

use serde::{Deserialize, Serialize};

/// A position in a source file (0-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (UTF-16 code units for LSP compatibility)
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// A byte span: `start` plus `length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: u32,
    pub length: u32,
}

impl TextSpan {
    pub fn new(start: u32, length: u32) -> Self {
        TextSpan { start, length }
    }

    pub fn from_bounds(start: u32, end: u32) -> Self {
        TextSpan {
            start,
            length: end.saturating_sub(start),
        }
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    /// Inclusive at both ends, so a caret right after the last character
    /// still counts as inside.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end()
    }

    #[inline]
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Start offset of every line, built once per file.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    /// `\r\n`, `\n` and a lone `\r` each end a line.
    pub fn build(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0u32];
        for i in memchr::memchr2_iter(b'\n', b'\r', bytes) {
            if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                continue;
            }
            line_starts.push((i + 1) as u32);
        }
        LineMap { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Offset of the first character of 0-based `line`.
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }

    fn line_of(&self, offset: u32) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Text of 0-based `line` without its terminator.
    fn line_text<'s>(&self, line: usize, source: &'s str) -> &'s str {
        let start = self.line_start(line).map_or(source.len(), |s| s as usize);
        let end = self.line_start(line + 1).map_or(source.len(), |s| s as usize);
        source
            .get(start.min(end)..end)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }

    /// 0-based position; the column counts UTF-16 code units as LSP does.
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = self.line_of(offset);
        let start = self.line_start(line).unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let character = source
            .get(start.min(end)..end)
            .unwrap_or("")
            .chars()
            .map(|ch| ch.len_utf16() as u32)
            .sum();
        Position::new(line as u32, character)
    }

    /// Byte offset of `position`. Columns past the end of the line clamp to
    /// the line end; a line past the end of the file is `None`.
    pub fn position_to_offset(&self, position: Position, source: &str) -> Option<u32> {
        let line = position.line as usize;
        let start = self.line_start(line)?;
        let text = self.line_text(line, source);
        let mut units = 0u32;
        for (byte, ch) in text.char_indices() {
            let width = ch.len_utf16() as u32;
            if units + width > position.character {
                return Some(start + byte as u32);
            }
            units += width;
        }
        Some(start + text.len() as u32)
    }

    /// 1-based `(line, offset)` pair, the shape code-fix text changes use.
    pub fn offset_to_line_offset(&self, offset: u32, source: &str) -> (u32, u32) {
        let pos = self.offset_to_position(offset, source);
        (pos.line + 1, pos.character + 1)
    }

    /// Inverse of [`LineMap::offset_to_line_offset`].
    pub fn line_offset_to_offset(&self, line: u32, offset: u32, source: &str) -> Option<u32> {
        if line == 0 || offset == 0 {
            return None;
        }
        self.position_to_offset(Position::new(line - 1, offset - 1), source)
    }
}
