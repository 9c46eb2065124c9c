//! Line decorations (background classes attached to a single row)

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one applied line decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecorationHandle(Uuid);

impl DecorationHandle {
    /// Creates a new decoration handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DecorationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecorationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deco:{}", self.0)
    }
}

/// A style class applied to one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDecoration {
    pub handle: DecorationHandle,
    pub line: usize,
    pub class: String,
}

/// All decorations currently applied to a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<LineDecoration>,
}

impl DecorationSet {
    pub fn new() -> Self {
        Self {
            decorations: Vec::new(),
        }
    }

    /// Adds a decoration and returns its handle
    pub fn add(&mut self, line: usize, class: impl Into<String>) -> DecorationHandle {
        let handle = DecorationHandle::new();
        self.decorations.push(LineDecoration {
            handle,
            line,
            class: class.into(),
        });
        handle
    }

    /// Removes exactly the decoration identified by `handle`
    pub fn remove(&mut self, handle: DecorationHandle) -> bool {
        if let Some(pos) = self.decorations.iter().position(|d| d.handle == handle) {
            self.decorations.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn get(&self, handle: DecorationHandle) -> Option<&LineDecoration> {
        self.decorations.iter().find(|d| d.handle == handle)
    }

    /// Style classes applied to `line`, in application order
    pub fn classes_for_line(&self, line: usize) -> Vec<&str> {
        self.decorations
            .iter()
            .filter(|d| d.line == line)
            .map(|d| d.class.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineDecoration> {
        self.decorations.iter()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn clear(&mut self) {
        self.decorations.clear();
    }
}
