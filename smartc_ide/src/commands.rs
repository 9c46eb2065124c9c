//! # Host Commands
//!
//! The user-facing surface of the page, as text commands.
//!
//! ## Command Set
//!
//! - `compile` - Compile the editor contents
//! - `save` / `load` - Save or restore the program
//! - `help` - Open the help page
//! - `copy` - Copy the assembly output
//! - `autosave on|off` - The "disable autosave" checkbox, inverted
//! - `nostalgic on|off` - The retro font checkbox
//! - `type <text>` - Type at the cursor (`\n` for a new line)
//! - `dismiss [success|error]` - Close a modal, or both
//! - `quit` - Exit the host
//!
//! ## Shortcuts
//!
//! `F1` help, `F2` save, `F4` compile, `F8` load.

use services_notification::ModalKind;
use thiserror::Error;

/// Host command error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostCommandError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("No action bound to key: {0}")]
    UnboundKey(String),
}

/// Host commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Compile,
    Save,
    Load,
    Help,
    CopyAssembly,
    /// Autosave checkbox (`enabled` is the inverse of the stored flag)
    Autosave { enabled: bool },
    NostalgicFont { enabled: bool },
    Type { text: String },
    /// Close one modal, or every modal when `None`
    Dismiss { target: Option<ModalKind> },
    Quit,
}

/// Keyboard shortcut for `key`, if one is bound
pub fn shortcut(key: &str) -> Option<HostCommand> {
    match key.to_ascii_lowercase().as_str() {
        "f1" => Some(HostCommand::Help),
        "f2" => Some(HostCommand::Save),
        "f4" => Some(HostCommand::Compile),
        "f8" => Some(HostCommand::Load),
        _ => None,
    }
}

/// Host command parser
pub struct HostCommandParser;

impl HostCommandParser {
    /// Parses a command string
    pub fn parse(input: &str) -> Result<HostCommand, HostCommandError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(HostCommandError::InvalidCommand(
                "Empty command".to_string(),
            ));
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        if let Some(command) = shortcut(&cmd) {
            return Ok(command);
        }

        match cmd.as_str() {
            "compile" => Ok(HostCommand::Compile),
            "save" => Ok(HostCommand::Save),
            "load" => Ok(HostCommand::Load),
            "help" => Ok(HostCommand::Help),
            "copy" | "copy-assembly" => Ok(HostCommand::CopyAssembly),
            "autosave" => Self::parse_switch(&parts[1..], "autosave")
                .map(|enabled| HostCommand::Autosave { enabled }),
            "nostalgic" => Self::parse_switch(&parts[1..], "nostalgic")
                .map(|enabled| HostCommand::NostalgicFont { enabled }),
            "type" => Self::parse_type(input),
            "dismiss" | "close" => Self::parse_dismiss(&parts[1..]),
            "quit" | "exit" => Ok(HostCommand::Quit),
            key if key.len() > 1 && key.starts_with('f') && key[1..].parse::<u8>().is_ok() => {
                Err(HostCommandError::UnboundKey(parts[0].to_string()))
            }
            _ => Err(HostCommandError::UnknownCommand(cmd)),
        }
    }

    /// Parses `on` / `off`
    fn parse_switch(args: &[&str], name: &str) -> Result<bool, HostCommandError> {
        let value = args
            .first()
            .ok_or_else(|| HostCommandError::MissingArgument(format!("{} on|off", name)))?;

        match value.to_lowercase().as_str() {
            "on" | "true" => Ok(true),
            "off" | "false" => Ok(false),
            other => Err(HostCommandError::InvalidArgument(other.to_string())),
        }
    }

    /// Parses `type <text>`, keeping the text's own spacing
    fn parse_type(input: &str) -> Result<HostCommand, HostCommandError> {
        let text = input
            .get(4..)
            .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
            .unwrap_or_default();

        if text.is_empty() {
            return Err(HostCommandError::MissingArgument("text".to_string()));
        }

        Ok(HostCommand::Type {
            text: unescape(text),
        })
    }

    fn parse_dismiss(args: &[&str]) -> Result<HostCommand, HostCommandError> {
        let target = match args.first().map(|a| a.to_lowercase()) {
            None => None,
            Some(kind) if kind == "all" => None,
            Some(kind) if kind == "success" => Some(ModalKind::Success),
            Some(kind) if kind == "error" => Some(ModalKind::Error),
            Some(kind) => return Err(HostCommandError::InvalidArgument(kind)),
        };

        Ok(HostCommand::Dismiss { target })
    }
}

/// Expands `\n`, `\t`, `\"` and `\\`
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
