#![no_std]

//! # Editor Core
//!
//! Headless model of the source editor widget used by the compile loop.
//!
//! ## Philosophy
//!
//! - **No_std compatible**: Uses alloc but not std
//! - **Deterministic**: Same call trace => same editor state
//! - **Line addressable**: Decorations and scrolling work on zero-based rows
//! - **Tolerant**: Stale line numbers are ignored, never a fault
//! - **Mechanism over policy**: The widget marks lines, callers decide when
//!
//! ## Design
//!
//! The core provides:
//! - EditorBridge: The narrow surface the orchestration layer talks to
//! - EditorCore: Reference widget (buffer, line decorations, scroll, focus)
//! - EditorSnapshot: Deterministic state for parity testing

extern crate alloc;

pub mod bridge;
pub mod buffer;
pub mod core;
pub mod decoration;
pub mod snapshot;

pub use bridge::EditorBridge;
pub use buffer::{Position, TextBuffer};
pub use crate::core::EditorCore;
pub use decoration::{DecorationHandle, DecorationSet, LineDecoration};
pub use snapshot::EditorSnapshot;
