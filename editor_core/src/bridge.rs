//! The editor surface seen by the compile loop and autosave

use crate::decoration::DecorationHandle;
use alloc::string::String;

/// Adapter over a line-addressable text editor widget
///
/// All row arguments are zero-based. Calls with a row outside the current
/// buffer are no-ops: the buffer may have shrunk since a row was reported.
pub trait EditorBridge {
    /// Returns the full buffer contents
    fn text(&self) -> String;

    /// Replaces the buffer contents wholesale
    fn set_text(&mut self, text: &str);

    /// Number of rows in the buffer
    fn line_count(&self) -> usize;

    /// Marks `line` with `style_class`
    ///
    /// Returns `None` (and changes nothing) when `line` is out of range.
    fn decorate_line(&mut self, line: usize, style_class: &str) -> Option<DecorationHandle>;

    /// Removes one decoration; unknown handles are ignored
    fn remove_decoration(&mut self, handle: DecorationHandle);

    /// Brings `line` into view
    fn scroll_to_line(&mut self, line: usize);

    /// Gives the widget input focus
    fn focus(&mut self);
}
