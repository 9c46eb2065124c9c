//! EditorCore widget model
//!
//! A complete, testable, no_std stand-in for the page's code editor: a text
//! buffer plus the line decorations, scroll target and focus state the
//! compile loop manipulates.

use alloc::string::String;

use crate::{
    bridge::EditorBridge,
    buffer::{Position, TextBuffer},
    decoration::{DecorationHandle, DecorationSet},
    snapshot::EditorSnapshot,
};

/// Editor widget state
pub struct EditorCore {
    buffer: TextBuffer,
    cursor: Position,
    decorations: DecorationSet,
    scroll_row: usize,
    focused: bool,
    revision: u64,
}

impl EditorCore {
    /// Create a new empty editor
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            cursor: Position::zero(),
            decorations: DecorationSet::new(),
            scroll_row: 0,
            focused: false,
            revision: 0,
        }
    }

    /// Create an editor holding `text`
    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.buffer = TextBuffer::from_string(text);
        editor
    }

    /// Types `text` at the cursor, as a user would
    pub fn type_text(&mut self, text: &str) -> bool {
        match self.buffer.insert_str(self.cursor, text) {
            Some(end) => {
                self.cursor = end;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Moves the cursor to the end of the buffer
    pub fn move_to_end(&mut self) {
        self.cursor = self.buffer.end();
    }

    /// Get a complete snapshot of editor state (for parity testing)
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            cursor: self.cursor,
            buffer_lines: self.buffer.lines().to_vec(),
            decorations: self.decorations.iter().cloned().collect(),
            scroll_row: self.scroll_row,
            focused: self.focused,
        }
    }

    // Public accessors for rendering/testing
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Bumped on every visible change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drops focus (another surface took it)
    pub fn blur(&mut self) {
        self.focused = false;
    }
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorBridge for EditorCore {
    fn text(&self) -> String {
        self.buffer.as_string()
    }

    fn set_text(&mut self, text: &str) {
        // Replacing the document drops every line class with it
        self.buffer = TextBuffer::from_string(text);
        self.decorations.clear();
        self.cursor = Position::zero();
        self.scroll_row = 0;
        self.revision += 1;
    }

    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn decorate_line(&mut self, line: usize, style_class: &str) -> Option<DecorationHandle> {
        if line >= self.buffer.line_count() {
            return None;
        }
        self.revision += 1;
        Some(self.decorations.add(line, style_class))
    }

    fn remove_decoration(&mut self, handle: DecorationHandle) {
        if self.decorations.remove(handle) {
            self.revision += 1;
        }
    }

    fn scroll_to_line(&mut self, line: usize) {
        if line >= self.buffer.line_count() {
            return;
        }
        self.scroll_row = line;
        self.revision += 1;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}
