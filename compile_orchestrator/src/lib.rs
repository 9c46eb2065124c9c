//! # Compile Orchestrator
//!
//! The compile-and-feedback loop: read the editor, run the external
//! compiler, and turn the result into assembly output, status text, a modal
//! notification and, for errors that name a line, a temporary highlight.
//!
//! ## Philosophy
//!
//! - **One error boundary**: Compiler and render failures are caught here, once
//! - **Collaborators are traits**: Compiler, colorizer and clock are injected
//! - **Explicit timers**: Highlight removal is a scheduler job, not a callback
//!
//! ## Example
//!
//! ```ignore
//! let mut orchestrator = CompileOrchestrator::new(factory, colorizer, Box::new(SystemClock::new()));
//! let outcome = orchestrator.run_compile(&mut editor, &mut scheduler, &mut notifications);
//! ```

pub mod clock;
pub mod colorizer;
pub mod compiler;
pub mod error_line;
pub mod orchestrator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use colorizer::{AssemblyView, Colorizer, ColorizerConfig, RenderError};
pub use compiler::{
    CompileError, CompileRequest, Compiler, CompilerFactory, MachineCode, SOURCE_LANGUAGE,
};
pub use error_line::parse_error_line;
pub use orchestrator::{
    CompileAttempt, CompileOrchestrator, CompileOutcome, FailureResult, SelfCheck,
    SelfCheckReport, SuccessResult, ERROR_DECORATION_MS, ERROR_LINE_CLASS, SELF_CHECK_HASH,
    SELF_CHECK_SOURCE,
};
