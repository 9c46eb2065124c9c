//! Editor snapshot for deterministic parity testing

use crate::{LineDecoration, Position};
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Complete editor state snapshot for parity testing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    pub cursor: Position,
    pub buffer_lines: Vec<String>,
    pub decorations: Vec<LineDecoration>,
    pub scroll_row: usize,
    pub focused: bool,
}

impl EditorSnapshot {
    /// Rows carrying at least one decoration, ascending
    pub fn decorated_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.decorations.iter().map(|d| d.line).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// Compute a deterministic hash of the snapshot state
    /// This is used for fast comparison in parity tests
    ///
    /// Decoration handles are random, so only their rows and classes count.
    #[cfg(test)]
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();

        // Hash cursor
        hasher.update(self.cursor.row.to_le_bytes());
        hasher.update(self.cursor.col.to_le_bytes());

        // Hash buffer
        for line in &self.buffer_lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }

        // Hash decorations
        for decoration in &self.decorations {
            hasher.update(decoration.line.to_le_bytes());
            hasher.update(decoration.class.as_bytes());
        }

        hasher.update(self.scroll_row.to_le_bytes());
        hasher.update([self.focused as u8]);

        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        u64::from_le_bytes(bytes)
    }
}
