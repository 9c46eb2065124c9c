//! # IDE Session
//!
//! One page worth of state: the editor, the timers, the modals, the store
//! and the compile loop, each owned by exactly one field. User actions and
//! timer callbacks are methods here; nothing is global.

use compile_orchestrator::{CompileOrchestrator, CompileOutcome, SelfCheckReport};
use editor_core::{DecorationHandle, EditorBridge, EditorCore};
use services_job_scheduler::JobScheduler;
use services_logger::{LogEntry, LogLevel, SessionLog};
use services_notification::{ModalKind, NotificationController};
use services_persistence::{
    Autosave, AutosaveOutcome, KeyValueStore, PersistenceError, PersistenceManager, Preference,
    AUTOSAVE_PERIOD_MS,
};
use thiserror::Error;

/// Placeholder in the title replaced by the compiler version
pub const VERSION_PLACEHOLDER: &str = "%version%";

const LOG_SOURCE: &str = "session";

/// Session error types
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(PersistenceError),
}

impl From<PersistenceError> for SessionError {
    fn from(err: PersistenceError) -> Self {
        SessionError::Storage(err)
    }
}

/// Buttons that flash a "clicked" label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Save,
    Load,
}

/// Timer keys; each key has at most one pending job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionJob {
    /// The recurring autosave
    Autosave,
    /// Removal of one compile-error highlight
    ClearDecoration(DecorationHandle),
    /// Return of a button to its idle label
    RestoreButton(Button),
}

impl From<DecorationHandle> for SessionJob {
    fn from(handle: DecorationHandle) -> Self {
        SessionJob::ClearDecoration(handle)
    }
}

/// Page font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontTheme {
    #[default]
    Default,
    /// Retro DOS font
    Nostalgic,
}

/// Idle and clicked text of a button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLabels {
    pub idle: String,
    pub clicked: String,
}

impl ButtonLabels {
    pub fn new(idle: impl Into<String>, clicked: impl Into<String>) -> Self {
        Self {
            idle: idle.into(),
            clicked: clicked.into(),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub autosave_period_ms: u64,
    /// How long a compile-error row stays highlighted
    pub decoration_ms: u64,
    /// How long a button shows its clicked label
    pub button_feedback_ms: u64,
    pub help_url: String,
    /// Window title, `%version%` is filled in at startup
    pub title_template: String,
    pub save_button: ButtonLabels,
    pub load_button: ButtonLabels,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_period_ms: AUTOSAVE_PERIOD_MS,
            decoration_ms: compile_orchestrator::ERROR_DECORATION_MS,
            button_feedback_ms: 5_000,
            help_url: "https://github.com/deleterium/SmartC/tree/stable/docs".to_string(),
            title_template: format!("SmartC IDE {}", VERSION_PLACEHOLDER),
            save_button: ButtonLabels::new("Save", "Saved!"),
            load_button: ButtonLabels::new("Load", "Loaded!"),
        }
    }
}

/// A button showing either its idle or clicked label
#[derive(Debug, Clone, PartialEq, Eq)]
struct ButtonState {
    labels: ButtonLabels,
    clicked: bool,
}

impl ButtonState {
    fn new(labels: ButtonLabels) -> Self {
        Self {
            labels,
            clicked: false,
        }
    }

    fn label(&self) -> &str {
        if self.clicked {
            &self.labels.clicked
        } else {
            &self.labels.idle
        }
    }
}

/// IDE session
pub struct Session<S> {
    config: SessionConfig,
    editor: EditorCore,
    scheduler: JobScheduler<SessionJob>,
    notifications: NotificationController,
    persistence: PersistenceManager<S>,
    autosave: Autosave<SessionJob>,
    orchestrator: CompileOrchestrator,
    save_button: ButtonState,
    load_button: ButtonState,
    font: FontTheme,
    title: String,
    clipboard: Option<String>,
    opened_urls: Vec<String>,
    log: SessionLog,
}

impl<S: KeyValueStore> Session<S> {
    /// Creates a session over `store`
    ///
    /// Nothing is loaded and no timer runs until [`Session::startup`].
    pub fn new(config: SessionConfig, store: S, orchestrator: CompileOrchestrator) -> Self {
        // Zero-length periods would re-fire forever within one advance
        let autosave = Autosave::with_period(SessionJob::Autosave, config.autosave_period_ms.max(1));
        let orchestrator = orchestrator.with_decoration_ms(config.decoration_ms);

        Self {
            editor: EditorCore::new(),
            scheduler: JobScheduler::new(),
            notifications: NotificationController::new(),
            persistence: PersistenceManager::new(store),
            autosave,
            orchestrator,
            save_button: ButtonState::new(config.save_button.clone()),
            load_button: ButtonState::new(config.load_button.clone()),
            font: FontTheme::Default,
            title: config.title_template.clone(),
            clipboard: None,
            opened_urls: Vec::new(),
            log: SessionLog::new(LogLevel::Debug),
            config,
        }
    }

    /// Page start: self-check, title, then stored options
    ///
    /// The saved program is restored only when autosave is enabled, and in
    /// that case the autosave timer starts.
    pub fn startup(&mut self) -> SelfCheckReport {
        let report = self.orchestrator.startup_self_check(&mut self.notifications);
        self.title = self
            .config
            .title_template
            .replace(VERSION_PLACEHOLDER, &report.compiler_version);
        self.collect_logs();

        if !self.persistence.get_preference(Preference::AutosaveDisabled) {
            if let Some(text) = self.persistence.load_text() {
                self.editor.set_text(&text);
            }
            self.autosave.start(&mut self.scheduler);
        }

        self.font = if self.persistence.get_preference(Preference::NostalgicFontEnabled) {
            FontTheme::Nostalgic
        } else {
            FontTheme::Default
        };

        self.log.record(
            LogEntry::info("session started")
                .with_source(LOG_SOURCE)
                .with_field("autosave", self.autosave.is_running(&self.scheduler))
                .with_field("font", format!("{:?}", self.font)),
        );
        report
    }

    /// Compile action
    pub fn compile(&mut self) -> CompileOutcome {
        let outcome = self.orchestrator.run_compile(
            &mut self.editor,
            &mut self.scheduler,
            &mut self.notifications,
        );
        self.collect_logs();
        outcome
    }

    /// Save action: writes the buffer and flashes the button
    pub fn save(&mut self) -> Result<(), SessionError> {
        let text = self.editor.text();
        self.persistence.save_text(&text)?;
        self.press(Button::Save);

        self.log.record(
            LogEntry::info("program saved")
                .with_source(LOG_SOURCE)
                .with_field("bytes", text.len()),
        );
        Ok(())
    }

    /// Load action: replaces the buffer with the saved program
    ///
    /// A program that was never saved loads as empty text.
    pub fn load(&mut self) {
        let text = self.persistence.load_text().unwrap_or_default();
        self.editor.set_text(&text);
        self.editor.focus();
        self.press(Button::Load);

        self.log.record(
            LogEntry::info("program loaded")
                .with_source(LOG_SOURCE)
                .with_field("bytes", text.len()),
        );
    }

    /// Help action: opens the help page
    pub fn open_help(&mut self) {
        self.opened_urls.push(self.config.help_url.clone());
        self.log.record(
            LogEntry::info("help opened")
                .with_source(LOG_SOURCE)
                .with_field("url", &self.config.help_url),
        );
    }

    /// Copy action: puts the plain assembly text on the clipboard
    pub fn copy_assembly(&mut self) {
        let text = self.orchestrator.assembly().plain_text().to_string();
        self.log.record(
            LogEntry::debug("assembly copied")
                .with_source(LOG_SOURCE)
                .with_field("bytes", text.len()),
        );
        self.clipboard = Some(text);
    }

    /// "Disable autosave" checkbox
    pub fn set_autosave_disabled(&mut self, disabled: bool) -> Result<(), SessionError> {
        self.autosave
            .set_disabled(disabled, &mut self.persistence, &mut self.scheduler)?;
        self.log.record(
            LogEntry::info("autosave toggled")
                .with_source(LOG_SOURCE)
                .with_field("disabled", disabled),
        );
        Ok(())
    }

    /// "Nostalgic font" checkbox
    pub fn set_nostalgic_font(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.font = if enabled {
            FontTheme::Nostalgic
        } else {
            FontTheme::Default
        };
        self.persistence
            .set_preference(Preference::NostalgicFontEnabled, enabled)?;
        Ok(())
    }

    /// Types text at the editor cursor
    pub fn type_text(&mut self, text: &str) -> bool {
        self.editor.type_text(text)
    }

    /// Close button of one modal
    pub fn dismiss(&mut self, kind: ModalKind) {
        self.notifications.dismiss(kind);
    }

    pub fn dismiss_all(&mut self) {
        self.notifications.dismiss_all();
    }

    /// Moves session time forward, running every timer that comes due
    ///
    /// Timers fire in deadline order at their own deadline, so a job re-armed
    /// by an earlier one can fire again within the same advance. Returns the
    /// number of jobs run.
    pub fn advance_time(&mut self, delta_ms: u64) -> usize {
        let target = self.scheduler.now_ms().saturating_add(delta_ms);
        let mut fired = 0;

        while let Some(deadline) = self.scheduler.next_deadline().filter(|d| *d <= target) {
            self.notifications.set_time(deadline);
            for job in self.scheduler.set_time(deadline) {
                fired += 1;
                self.dispatch(job.key);
            }
        }

        self.scheduler.set_time(target);
        self.notifications.set_time(target);
        fired
    }

    fn dispatch(&mut self, job: SessionJob) {
        match job {
            SessionJob::Autosave => {
                let result =
                    self.autosave
                        .on_fire(&self.editor, &mut self.persistence, &mut self.scheduler);
                let entry = match result {
                    Ok(AutosaveOutcome::Saved { bytes }) => {
                        LogEntry::debug("autosaved").with_field("bytes", bytes)
                    }
                    Ok(AutosaveOutcome::Skipped) => LogEntry::debug("autosave skipped"),
                    Err(err) => LogEntry::warn("autosave failed").with_field("error", err),
                };
                self.log.record(entry.with_source("autosave"));
            }
            SessionJob::ClearDecoration(handle) => {
                self.orchestrator
                    .clear_error_decoration(&mut self.editor, handle);
                self.collect_logs();
            }
            SessionJob::RestoreButton(button) => {
                self.button_mut(button).clicked = false;
            }
        }
    }

    fn press(&mut self, button: Button) {
        self.button_mut(button).clicked = true;
        self.scheduler
            .schedule(SessionJob::RestoreButton(button), self.config.button_feedback_ms);
    }

    fn button_mut(&mut self, button: Button) -> &mut ButtonState {
        match button {
            Button::Save => &mut self.save_button,
            Button::Load => &mut self.load_button,
        }
    }

    fn collect_logs(&mut self) {
        for entry in self.orchestrator.drain_log() {
            self.log.record(entry);
        }
    }

    pub fn button_label(&self, button: Button) -> &str {
        match button {
            Button::Save => self.save_button.label(),
            Button::Load => self.load_button.label(),
        }
    }

    pub fn editor(&self) -> &EditorCore {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorCore {
        &mut self.editor
    }

    pub fn notifications(&self) -> &NotificationController {
        &self.notifications
    }

    pub fn scheduler(&self) -> &JobScheduler<SessionJob> {
        &self.scheduler
    }

    pub fn persistence(&self) -> &PersistenceManager<S> {
        &self.persistence
    }

    pub fn orchestrator(&self) -> &CompileOrchestrator {
        &self.orchestrator
    }

    pub fn autosave_running(&self) -> bool {
        self.autosave.is_running(&self.scheduler)
    }

    pub fn autosave_disabled(&self) -> bool {
        self.persistence.get_preference(Preference::AutosaveDisabled)
    }

    pub fn font(&self) -> FontTheme {
        self.font
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn opened_urls(&self) -> &[String] {
        &self.opened_urls
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Hands recorded log entries to the host
    pub fn drain_log(&mut self) -> Vec<LogEntry> {
        self.log.drain()
    }
}
