//! # SmartC IDE Host
//!
//! Runs the SmartC IDE page as a terminal program: one session, driven by
//! scripted or typed commands, rendered as a text snapshot.
//!
//! ## Philosophy
//!
//! - **Session owns state**: Editor, timers, modals and store live in one value
//! - **Output is snapshot rendering**: The whole page is redrawn when it changes
//! - **Deterministic mode is first-class**: Scripts drive session time explicitly
//! - **Compiler is external**: Any process speaking the JSON exchange will do
//!
//! ## Responsibilities
//!
//! The host runtime:
//! - Starts the session (self-check, title, stored options)
//! - Maps commands and shortcut keys onto page actions
//! - Advances timers (autosave, error highlights, button labels)
//! - Keeps the store in a snapshot file across runs
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Compile SmartC itself
//! - Render HTML (colorized markup is kept, the snapshot shows plain text)
//! - Share a store between concurrent sessions

pub mod commands;
pub mod compiler_bridge;
pub mod highlight;
pub mod input_script;
pub mod runtime;
pub mod session;
pub mod store;

pub use commands::{shortcut, HostCommand, HostCommandError, HostCommandParser};
pub use compiler_bridge::{CompilerCommand, ProcessCompiler, ProcessCompilerFactory};
pub use highlight::AsmHighlighter;
pub use input_script::{InputScript, InputScriptError, ScriptedInput};
pub use runtime::{HostMode, HostRuntime, HostRuntimeConfig, HostRuntimeError};
pub use session::{
    Button, ButtonLabels, FontTheme, Session, SessionConfig, SessionError, SessionJob,
    VERSION_PLACEHOLDER,
};
pub use store::{FileStore, HostStore, StoreError};
