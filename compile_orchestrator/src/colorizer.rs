//! Assembly colorizer contract and the assembly output panel

use thiserror::Error;

/// Rendering failures (colorizer or output panel)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Colorizer failed: {0}")]
    Colorizer(String),

    #[error("Machine code descriptor could not be rendered: {0}")]
    Descriptor(String),
}

/// Markup the colorizer wraps around its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorizerConfig {
    /// Emitted once before everything
    pub pre_all: String,
    /// Emitted before each line
    pub pre_line: String,
    /// Emitted after each line
    pub post_line: String,
}

impl Default for ColorizerConfig {
    fn default() -> Self {
        Self {
            pre_all: String::new(),
            pre_line: String::new(),
            post_line: "<br>".to_string(),
        }
    }
}

/// Turns assembly text into styled markup
pub trait Colorizer {
    fn color_text(&self, assembly: &str, config: &ColorizerConfig) -> Result<String, RenderError>;
}

/// The assembly output panel
///
/// Holds the styled markup and the plain text it was made from. The plain
/// text is what the copy action puts on the clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyView {
    markup: String,
    plain: String,
}

impl AssemblyView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, markup: String, plain: String) {
        self.markup = markup;
        self.plain = plain;
    }

    pub fn clear(&mut self) {
        self.markup.clear();
        self.plain.clear();
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn plain_text(&self) -> &str {
        &self.plain
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_breaks_lines() {
        let config = ColorizerConfig::default();
        assert_eq!(config.pre_all, "");
        assert_eq!(config.pre_line, "");
        assert_eq!(config.post_line, "<br>");
    }

    #[test]
    fn test_assembly_view_clear() {
        let mut view = AssemblyView::new();
        view.set("<span>PSH</span><br>".to_string(), "PSH\n".to_string());
        assert!(!view.is_empty());
        assert_eq!(view.plain_text(), "PSH\n");

        view.clear();
        assert!(view.is_empty());
        assert_eq!(view.plain_text(), "");
    }
}
