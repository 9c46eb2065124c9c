//! # Input Script Parser
//!
//! Provides a simple scripted input format for deterministic testing and demos.
//!
//! ## Format
//!
//! Scripts are line-based, with each line representing one input action:
//! - Commands: `compile`, `save`, `autosave off`, ... (see [`crate::commands`])
//! - Shortcut keys: `F1`, `F2`, `F4`, `F8`
//! - Text strings: `"long a;\n"` (typed at the cursor, `\n` breaks the line)
//! - Comments: `# This is a comment`
//! - Delays: `wait 100ms`, `wait 15s` (advance session time)
//!
//! ## Example
//!
//! ```text
//! # Type a broken program and compile it
//! "long a\n"
//! F4
//! wait 10s
//! ```

use crate::commands::{unescape, HostCommand, HostCommandParser};
use std::collections::VecDeque;
use thiserror::Error;

/// Input script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,

    #[error("Invalid delay format: {0}")]
    InvalidDelay(String),
}

/// A single scripted input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    /// A user action
    Command(HostCommand),
    /// Wait for a duration (in milliseconds)
    Wait(u64),
}

/// Input script
///
/// Parses and provides scripted input events for deterministic testing.
#[derive(Debug, Clone)]
pub struct InputScript {
    inputs: VecDeque<ScriptedInput>,
}

impl InputScript {
    /// Creates a new empty input script
    pub fn new() -> Self {
        Self {
            inputs: VecDeque::new(),
        }
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();

        for (line_num, line) in text.lines().enumerate() {
            if let Some(input) = Self::parse_line(line, line_num + 1)? {
                inputs.push_back(input);
            }
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }

        Ok(Self { inputs })
    }

    /// Parses a single line of script
    ///
    /// Blank lines and comments yield `None`.
    pub fn parse_line(
        line: &str,
        line_num: usize,
    ) -> Result<Option<ScriptedInput>, InputScriptError> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        if let Some(duration_str) = line.strip_prefix("wait ") {
            let millis =
                Self::parse_duration(duration_str).map_err(|e| InputScriptError::ParseError {
                    line: line_num,
                    message: e.to_string(),
                })?;
            return Ok(Some(ScriptedInput::Wait(millis)));
        }

        // Quoted strings are typed verbatim
        if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
            let text = unescape(&line[1..line.len() - 1]);
            return Ok(Some(ScriptedInput::Command(HostCommand::Type { text })));
        }

        let command = HostCommandParser::parse(line).map_err(|e| InputScriptError::ParseError {
            line: line_num,
            message: e.to_string(),
        })?;
        Ok(Some(ScriptedInput::Command(command)))
    }

    /// Parses a duration string (e.g., "100ms", "1s")
    fn parse_duration(s: &str) -> Result<u64, InputScriptError> {
        let s = s.trim().to_lowercase();

        if let Some(ms_str) = s.strip_suffix("ms") {
            ms_str
                .trim()
                .parse::<u64>()
                .map_err(|_| InputScriptError::InvalidDelay(s.to_string()))
        } else if let Some(s_str) = s.strip_suffix('s') {
            s_str
                .trim()
                .parse::<u64>()
                .map(|s| s * 1000)
                .map_err(|_| InputScriptError::InvalidDelay(s.to_string()))
        } else {
            Err(InputScriptError::InvalidDelay(s.to_string()))
        }
    }

    /// Returns the next input event, if any
    pub fn next_input(&mut self) -> Option<ScriptedInput> {
        self.inputs.pop_front()
    }

    /// Returns true if the script has more inputs
    pub fn has_more(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Returns the number of remaining inputs
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Default for InputScript {
    fn default() -> Self {
        Self::new()
    }
}
