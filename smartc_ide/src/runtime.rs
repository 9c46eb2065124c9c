//! # Host Runtime
//!
//! The event loop around one IDE session: input, timers, render.

use crate::commands::{HostCommand, HostCommandParser};
use crate::compiler_bridge::{CompilerCommand, ProcessCompilerFactory};
use crate::highlight::AsmHighlighter;
use crate::input_script::{InputScript, ScriptedInput};
use crate::session::{Button, FontTheme, Session, SessionConfig, SessionError};
use crate::store::{FileStore, HostStore, StoreError};
use compile_orchestrator::{CompileOrchestrator, SystemClock};
use editor_core::EditorBridge;
use services_notification::ModalKind;
use services_persistence::MemoryStore;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Script error: {0}")]
    ScriptError(String),

    #[error("Command error: {0}")]
    CommandError(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No compiler configured")]
    MissingCompiler,
}

/// Host mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Deterministic: inputs come from a script, time only moves on `wait`
    Script,
    /// Commands are read from stdin, time follows the wall clock
    Interactive,
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostRuntimeConfig {
    /// Host mode
    pub mode: HostMode,
    /// Input script text (for script mode)
    pub script: Option<String>,
    /// Maximum steps to run (0 = unlimited)
    pub max_steps: usize,
    /// Snapshot file for the store; memory only when `None`
    pub store_path: Option<PathBuf>,
    /// Compiler process
    pub compiler: Option<CompilerCommand>,
    /// Overrides the help page address
    pub help_url: Option<String>,
    /// Print session log entries to stderr
    pub verbose: bool,
}

impl Default for HostRuntimeConfig {
    fn default() -> Self {
        Self {
            mode: HostMode::Script,
            script: None,
            max_steps: 0,
            store_path: None,
            compiler: None,
            help_url: None,
            verbose: false,
        }
    }
}

/// Host runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    /// Startup has not run yet
    Booting,
    Running,
    Shutdown,
}

/// Host runtime
pub struct HostRuntime {
    config: HostRuntimeConfig,
    session: Session<HostStore>,
    script: Option<InputScript>,
    state: HostState,
    steps: usize,
    /// Last frame printed, to skip identical redraws
    last_frame: Option<String>,
    /// Wall-clock reference for interactive mode
    last_tick: Instant,
}

impl HostRuntime {
    /// Creates a runtime that compiles through an external process
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostRuntimeError> {
        let compiler = config
            .compiler
            .clone()
            .ok_or(HostRuntimeError::MissingCompiler)?;

        let store = match &config.store_path {
            Some(path) => HostStore::File(FileStore::open(path)?),
            None => HostStore::Memory(MemoryStore::new()),
        };

        let orchestrator = CompileOrchestrator::new(
            Box::new(ProcessCompilerFactory::new(compiler)),
            Box::new(AsmHighlighter::new()),
            Box::new(SystemClock::new()),
        );

        let mut session_config = SessionConfig::default();
        if let Some(url) = &config.help_url {
            session_config.help_url = url.clone();
        }

        let session = Session::new(session_config, store, orchestrator);
        Self::with_session(config, session)
    }

    /// Creates a runtime around an existing session
    pub fn with_session(
        config: HostRuntimeConfig,
        session: Session<HostStore>,
    ) -> Result<Self, HostRuntimeError> {
        let script = match &config.script {
            Some(text) => Some(
                InputScript::from_text(text)
                    .map_err(|e| HostRuntimeError::ScriptError(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            session,
            script,
            state: HostState::Booting,
            steps: 0,
            last_frame: None,
            last_tick: Instant::now(),
        })
    }

    /// Runs the host event loop
    ///
    /// Returns when:
    /// - Quit command received
    /// - Max steps reached (if configured)
    /// - Script exhausted (in script mode)
    /// - Stdin closed (in interactive mode)
    pub fn run(&mut self) -> Result<(), HostRuntimeError> {
        self.boot();

        loop {
            if self.state == HostState::Shutdown {
                break;
            }

            if self.config.max_steps > 0 && self.steps >= self.config.max_steps {
                break;
            }

            if self.config.mode == HostMode::Script
                && !self.script.as_ref().is_some_and(InputScript::has_more)
            {
                break;
            }

            self.step()?;
            self.steps += 1;
        }

        Ok(())
    }

    /// Executes one step of the event loop
    pub fn step(&mut self) -> Result<(), HostRuntimeError> {
        self.boot();

        match self.config.mode {
            HostMode::Script => self.pump_script()?,
            HostMode::Interactive => self.pump_stdin()?,
        }

        self.flush_log();
        self.render();
        Ok(())
    }

    /// Page load, once
    fn boot(&mut self) {
        if self.state != HostState::Booting {
            return;
        }
        self.session.startup();
        self.state = HostState::Running;
        self.last_tick = Instant::now();
        self.flush_log();
        self.render();
    }

    fn pump_script(&mut self) -> Result<(), HostRuntimeError> {
        let Some(input) = self.script.as_mut().and_then(InputScript::next_input) else {
            return Ok(());
        };

        match input {
            ScriptedInput::Command(command) => self.apply(command),
            ScriptedInput::Wait(millis) => {
                self.session.advance_time(millis);
                Ok(())
            }
        }
    }

    /// Reads one command from stdin; end of input quits
    fn pump_stdin(&mut self) -> Result<(), HostRuntimeError> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;

        let elapsed = self.last_tick.elapsed();
        self.last_tick = Instant::now();
        self.session
            .advance_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));

        if read == 0 {
            self.state = HostState::Shutdown;
            return Ok(());
        }

        match InputScript::parse_line(&line, self.steps + 1) {
            Ok(Some(ScriptedInput::Command(command))) => {
                if let Err(err) = self.apply(command) {
                    eprintln!("{}", err);
                }
            }
            Ok(Some(ScriptedInput::Wait(millis))) => {
                self.session.advance_time(millis);
            }
            Ok(None) => {}
            Err(err) => eprintln!("{}", err),
        }
        Ok(())
    }

    /// Executes a host command given as text
    pub fn execute_command(&mut self, command_text: &str) -> Result<(), HostRuntimeError> {
        let command = HostCommandParser::parse(command_text)
            .map_err(|e| HostRuntimeError::CommandError(e.to_string()))?;
        self.boot();
        self.apply(command)
    }

    fn apply(&mut self, command: HostCommand) -> Result<(), HostRuntimeError> {
        match command {
            HostCommand::Compile => {
                self.session.compile();
            }
            HostCommand::Save => self.session.save()?,
            HostCommand::Load => self.session.load(),
            HostCommand::Help => {
                self.session.open_help();
                if let Some(url) = self.session.opened_urls().last() {
                    println!("Opening {}", url);
                }
            }
            HostCommand::CopyAssembly => self.session.copy_assembly(),
            HostCommand::Autosave { enabled } => self.session.set_autosave_disabled(!enabled)?,
            HostCommand::NostalgicFont { enabled } => self.session.set_nostalgic_font(enabled)?,
            HostCommand::Type { text } => {
                self.session.type_text(&text);
            }
            HostCommand::Dismiss { target: Some(kind) } => self.session.dismiss(kind),
            HostCommand::Dismiss { target: None } => self.session.dismiss_all(),
            HostCommand::Quit => {
                self.state = HostState::Shutdown;
            }
        }

        Ok(())
    }

    fn flush_log(&mut self) {
        for entry in self.session.drain_log() {
            if self.config.verbose {
                eprintln!("{}", entry);
            }
        }
    }

    /// Prints the page if it changed since the last frame
    fn render(&mut self) {
        let frame = self.render_text();
        if self.last_frame.as_deref() != Some(frame.as_str()) {
            print!("{}", frame);
            self.last_frame = Some(frame);
        }
    }

    /// Renders the page as text
    pub fn render_text(&self) -> String {
        let session = &self.session;
        let mut out = String::new();

        out.push_str(&format!("=== {} ===\n", session.title()));

        for kind in [ModalKind::Success, ModalKind::Error] {
            if !session.notifications().is_visible(kind) {
                continue;
            }
            if let Some(text) = session.notifications().modal_text(kind) {
                out.push_str(&format!("[{} modal]\n", kind));
                for line in text.lines() {
                    out.push_str(&format!("  {}\n", line));
                }
            }
        }

        out.push_str("--- editor ---\n");
        let editor = session.editor();
        for (row, line) in editor.buffer().lines().iter().enumerate() {
            let classes = editor.decorations().classes_for_line(row);
            let marker = if classes.is_empty() { ' ' } else { '>' };
            out.push_str(&format!("{}{:>4} | {}", marker, row + 1, line));
            if !classes.is_empty() {
                out.push_str(&format!("    <{}>", classes.join(" ")));
            }
            out.push('\n');
        }

        let assembly = session.orchestrator().assembly();
        if !assembly.is_empty() {
            out.push_str("--- assembly ---\n");
            for line in assembly.plain_text().lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }

        out.push_str("--- status ---\n");
        for line in session.notifications().status().lines() {
            out.push_str(&format!("  {}\n", line));
        }

        out.push_str(&format!(
            "[{}] [{}] autosave: {} font: {}\n",
            session.button_label(Button::Save),
            session.button_label(Button::Load),
            if session.autosave_disabled() { "off" } else { "on" },
            match session.font() {
                FontTheme::Default => "default",
                FontTheme::Nostalgic => "nostalgic",
            }
        ));
        out
    }

    /// Returns the step count
    pub fn step_count(&self) -> usize {
        self.steps
    }

    /// Returns true once a quit command ran
    pub fn is_shutdown(&self) -> bool {
        self.state == HostState::Shutdown
    }

    pub fn session(&self) -> &Session<HostStore> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<HostStore> {
        &mut self.session
    }

    /// Current editor text (for testing)
    pub fn editor_text(&self) -> String {
        self.session.editor().text()
    }
}
