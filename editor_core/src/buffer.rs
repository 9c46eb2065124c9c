//! Text buffer and position types

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Cursor position in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Text buffer with line-based storage
///
/// Lines are separated by `\n`; a trailing newline produces a trailing
/// empty line so `as_string` reproduces the loaded text exactly. `\r\n`
/// is normalized to `\n` on the way in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    pub fn from_string(content: &str) -> Self {
        let lines = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).into())
            .collect();
        Self { lines }
    }

    pub fn as_string(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    pub fn line_length(&self, row: usize) -> usize {
        self.lines.get(row).map(|s| s.len()).unwrap_or(0)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Position just past the last character
    pub fn end(&self) -> Position {
        let row = self.lines.len() - 1;
        Position::new(row, self.lines[row].len())
    }

    /// Insert a character at position
    pub fn insert_char(&mut self, pos: Position, ch: char) -> bool {
        if pos.row >= self.lines.len() {
            return false;
        }

        let line = &mut self.lines[pos.row];
        if pos.col > line.len() || !line.is_char_boundary(pos.col) {
            return false;
        }

        line.insert(pos.col, ch);
        true
    }

    /// Insert a newline at position, splitting the line
    pub fn insert_newline(&mut self, pos: Position) -> bool {
        if pos.row >= self.lines.len() {
            return false;
        }

        let line = &mut self.lines[pos.row];
        if pos.col > line.len() || !line.is_char_boundary(pos.col) {
            return false;
        }

        let rest = line.split_off(pos.col);
        self.lines.insert(pos.row + 1, rest);
        true
    }

    /// Insert text at position, returning the position after the insert
    pub fn insert_str(&mut self, pos: Position, text: &str) -> Option<Position> {
        let mut cursor = pos;
        for ch in text.chars() {
            match ch {
                '\r' => continue,
                '\n' => {
                    if !self.insert_newline(cursor) {
                        return None;
                    }
                    cursor = Position::new(cursor.row + 1, 0);
                }
                _ => {
                    if !self.insert_char(cursor, ch) {
                        return None;
                    }
                    cursor.col += ch.len_utf8();
                }
            }
        }
        Some(cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
