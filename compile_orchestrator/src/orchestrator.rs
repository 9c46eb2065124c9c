//! The compile-and-feedback loop

use editor_core::{DecorationHandle, EditorBridge};
use services_job_scheduler::JobScheduler;
use services_logger::{LogEntry, LogLevel, SessionLog};
use services_notification::NotificationController;

use crate::clock::Clock;
use crate::colorizer::{AssemblyView, Colorizer, ColorizerConfig};
use crate::compiler::{CompileError, CompileRequest, Compiler, CompilerFactory, MachineCode};
use crate::error_line::parse_error_line;

/// Style class applied to the row a compile error points at
pub const ERROR_LINE_CLASS: &str = "asmError";

/// How long an error row stays highlighted
pub const ERROR_DECORATION_MS: u64 = 10_000;

/// Program compiled at startup to check the compiler is deterministic
pub const SELF_CHECK_SOURCE: &str = "#pragma version dev\n#pragma maxAuxVars 1\nlong a, b, c; a=b/~c;";

/// Hash the startup program must produce
pub const SELF_CHECK_HASH: &str = "7488355358104845254";

const LOG_SOURCE: &str = "compile";

/// A successful compile
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessResult {
    pub assembly_text: String,
    pub machine_code: MachineCode,
    pub elapsed_ms: u64,
}

/// A failed compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureResult {
    pub message: String,
    /// 1-based row taken from a leading `At line: N`
    pub source_line: Option<u32>,
    pub stack_trace: Option<String>,
    /// Highlight applied for `source_line`, if the row still exists
    pub decoration: Option<DecorationHandle>,
}

/// Result of one compile action
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
    Success(SuccessResult),
    Failure(FailureResult),
}

impl CompileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutcome::Success(_))
    }
}

/// One compile action, from text snapshot to result
#[derive(Debug, Clone, PartialEq)]
pub struct CompileAttempt {
    pub source: String,
    pub started_ms: u64,
    pub outcome: Option<CompileOutcome>,
}

/// Startup self-check verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfCheck {
    /// The startup program produced the expected hash
    Passed,
    /// It compiled to a different hash
    Failed,
    /// The compiler raised an error
    Crashed,
}

impl SelfCheck {
    /// Status text shown for the verdict
    pub fn message(&self) -> &'static str {
        match self {
            SelfCheck::Passed => "Start up test done!",
            SelfCheck::Failed => "Start up test failed...",
            SelfCheck::Crashed => "Start up test crashed...",
        }
    }
}

/// Self-check verdict plus the compiler version that ran it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCheckReport {
    pub verdict: SelfCheck,
    pub compiler_version: String,
}

/// Runs compiles and reflects their results into the editor, status text
/// and modals
///
/// `run_compile` never returns an error: every compiler and render failure
/// becomes visible state here and nowhere else.
pub struct CompileOrchestrator {
    factory: Box<dyn CompilerFactory>,
    colorizer: Box<dyn Colorizer>,
    colorizer_config: ColorizerConfig,
    clock: Box<dyn Clock>,
    assembly: AssemblyView,
    /// The single error highlight currently applied
    error_decoration: Option<DecorationHandle>,
    decoration_ms: u64,
    last_attempt: Option<CompileAttempt>,
    log: SessionLog,
}

impl CompileOrchestrator {
    pub fn new(
        factory: Box<dyn CompilerFactory>,
        colorizer: Box<dyn Colorizer>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            factory,
            colorizer,
            colorizer_config: ColorizerConfig::default(),
            clock,
            assembly: AssemblyView::new(),
            error_decoration: None,
            decoration_ms: ERROR_DECORATION_MS,
            last_attempt: None,
            log: SessionLog::new(LogLevel::Debug),
        }
    }

    /// Overrides how long error rows stay highlighted
    pub fn with_decoration_ms(mut self, decoration_ms: u64) -> Self {
        self.decoration_ms = decoration_ms;
        self
    }

    pub fn with_colorizer_config(mut self, config: ColorizerConfig) -> Self {
        self.colorizer_config = config;
        self
    }

    /// Compiles the current editor contents and reports the result
    ///
    /// Error highlights are removed by a `K::from(handle)` job scheduled
    /// `decoration_ms` after the failure; the owner dispatches it to
    /// [`CompileOrchestrator::clear_error_decoration`].
    pub fn run_compile<E, K>(
        &mut self,
        editor: &mut E,
        scheduler: &mut JobScheduler<K>,
        notifications: &mut NotificationController,
    ) -> CompileOutcome
    where
        E: EditorBridge + ?Sized,
        K: Clone + PartialEq + From<DecorationHandle>,
    {
        let source = editor.text();
        let started_ms = self.clock.now_ms();
        self.last_attempt = Some(CompileAttempt {
            source: source.clone(),
            started_ms,
            outcome: None,
        });

        if let Some(handle) = self.error_decoration.take() {
            editor.remove_decoration(handle);
            scheduler.cancel(&K::from(handle));
        }

        self.log.record(
            LogEntry::debug("compile started")
                .with_source(LOG_SOURCE)
                .with_field("bytes", source.len()),
        );

        let mut compiler = self.factory.create(CompileRequest::c(source));
        let outcome = match self.compile_and_render(compiler.as_mut(), started_ms) {
            Ok(success) => {
                self.report_success(&success, notifications);
                CompileOutcome::Success(success)
            }
            Err(err) => {
                let failure = self.report_failure(err, editor, scheduler, notifications);
                CompileOutcome::Failure(failure)
            }
        };

        if let Some(attempt) = self.last_attempt.as_mut() {
            attempt.outcome = Some(outcome.clone());
        }
        outcome
    }

    fn compile_and_render(
        &mut self,
        compiler: &mut dyn Compiler,
        started_ms: u64,
    ) -> Result<SuccessResult, CompileError> {
        compiler.compile()?;
        let assembly_text = compiler.assembly_code()?;
        let machine_code = compiler.machine_code()?;

        let markup = self
            .colorizer
            .color_text(&assembly_text, &self.colorizer_config)?;
        self.assembly.set(markup, assembly_text.clone());

        Ok(SuccessResult {
            assembly_text,
            machine_code,
            elapsed_ms: self.clock.now_ms().saturating_sub(started_ms),
        })
    }

    fn report_success(&mut self, success: &SuccessResult, notifications: &mut NotificationController) {
        let summary = format!(
            "Compile successful!!!\nDone at {} in {} ms.\nMachine code hash ID: {}",
            self.clock.time_of_day(),
            success.elapsed_ms,
            success.machine_code.hash_id
        );
        notifications.show_success(&summary);

        let status = match success.machine_code.to_pretty_json() {
            Ok(descriptor) => format!("{}\n\n{}", summary, descriptor),
            Err(err) => {
                self.log.record(
                    LogEntry::warn("descriptor not rendered")
                        .with_source(LOG_SOURCE)
                        .with_field("error", &err),
                );
                format!("{}\n\n{}", summary, err)
            }
        };
        notifications.set_status(status);

        self.log.record(
            LogEntry::info("compile succeeded")
                .with_source(LOG_SOURCE)
                .with_field("hash", &success.machine_code.hash_id)
                .with_field("elapsed_ms", success.elapsed_ms),
        );
    }

    fn report_failure<E, K>(
        &mut self,
        err: CompileError,
        editor: &mut E,
        scheduler: &mut JobScheduler<K>,
        notifications: &mut NotificationController,
    ) -> FailureResult
    where
        E: EditorBridge + ?Sized,
        K: Clone + PartialEq + From<DecorationHandle>,
    {
        self.assembly.clear();

        let message = format!("Compile failed\n\n{}", err.message);
        notifications.show_error(&message);
        let status = match &err.stack {
            Some(stack) => format!("{}\n\n{}", message, stack),
            None => message,
        };
        notifications.set_status(status);

        let source_line = parse_error_line(&err.message);
        let decoration = source_line.and_then(|line| {
            let row = (line - 1) as usize;
            let handle = editor.decorate_line(row, ERROR_LINE_CLASS)?;
            editor.scroll_to_line(row);
            scheduler.schedule(K::from(handle), self.decoration_ms);
            Some(handle)
        });
        self.error_decoration = decoration;

        let mut entry = LogEntry::warn("compile failed")
            .with_source(LOG_SOURCE)
            .with_field("error", &err.message);
        if let Some(line) = source_line {
            entry = entry.with_field("line", line);
        }
        self.log.record(entry);

        FailureResult {
            message: err.message,
            source_line,
            stack_trace: err.stack,
            decoration,
        }
    }

    /// Removes an error highlight whose timer fired
    ///
    /// Only `handle` is touched; a newer highlight stays in place.
    pub fn clear_error_decoration<E: EditorBridge + ?Sized>(
        &mut self,
        editor: &mut E,
        handle: DecorationHandle,
    ) {
        editor.remove_decoration(handle);
        if self.error_decoration == Some(handle) {
            self.error_decoration = None;
        }
        self.log.record(
            LogEntry::debug("error highlight removed")
                .with_source(LOG_SOURCE)
                .with_field("handle", handle),
        );
    }

    /// Compiles the fixed startup program and writes the verdict to the
    /// status output
    pub fn startup_self_check(&mut self, notifications: &mut NotificationController) -> SelfCheckReport {
        let mut compiler = self.factory.create(CompileRequest::c(SELF_CHECK_SOURCE));

        let verdict = match compiler.compile().and_then(|_| compiler.machine_code()) {
            Ok(code) if code.hash_id == SELF_CHECK_HASH => SelfCheck::Passed,
            Ok(_) => SelfCheck::Failed,
            Err(_) => SelfCheck::Crashed,
        };
        notifications.set_status(verdict.message());

        let compiler_version = compiler.compiler_version();
        let level = if verdict == SelfCheck::Passed {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        self.log.record(
            LogEntry::new(level, verdict.message())
                .with_source(LOG_SOURCE)
                .with_field("version", &compiler_version),
        );

        SelfCheckReport {
            verdict,
            compiler_version,
        }
    }

    /// The assembly output panel
    pub fn assembly(&self) -> &AssemblyView {
        &self.assembly
    }

    pub fn error_decoration(&self) -> Option<DecorationHandle> {
        self.error_decoration
    }

    pub fn last_attempt(&self) -> Option<&CompileAttempt> {
        self.last_attempt.as_ref()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Hands recorded log entries to the owner
    pub fn drain_log(&mut self) -> Vec<LogEntry> {
        self.log.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::colorizer::RenderError;
    use chrono::NaiveTime;
    use editor_core::EditorCore;
    use services_notification::ModalKind;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Job {
        Clear(DecorationHandle),
    }

    impl From<DecorationHandle> for Job {
        fn from(handle: DecorationHandle) -> Self {
            Job::Clear(handle)
        }
    }

    /// Compiler whose behaviour is picked by the source text
    struct ScriptedCompiler {
        source: String,
        clock: Rc<ManualClock>,
        compiled: bool,
    }

    impl Compiler for ScriptedCompiler {
        fn compile(&mut self) -> Result<(), CompileError> {
            self.clock.advance(12);
            if let Some(rest) = self.source.strip_prefix("fail:") {
                let message = rest.lines().next().unwrap_or_default().trim();
                return Err(CompileError::new(message).with_stack("at compile"));
            }
            self.compiled = true;
            Ok(())
        }

        fn assembly_code(&self) -> Result<String, CompileError> {
            if !self.compiled {
                return Err(CompileError::new("not compiled"));
            }
            Ok("PSH $a\nFIN".to_string())
        }

        fn machine_code(&self) -> Result<MachineCode, CompileError> {
            if self.source.starts_with("nodesc") {
                return Err(CompileError::new("no descriptor"));
            }
            if self.source == SELF_CHECK_SOURCE {
                return Ok(MachineCode::new(SELF_CHECK_HASH));
            }
            if self.source.starts_with("wrong") {
                return Ok(MachineCode::new("1"));
            }
            Ok(MachineCode::new("42").with_field("ByteCode", "0102"))
        }

        fn compiler_version(&self) -> String {
            "2.0".to_string()
        }
    }

    struct Plain;

    impl Colorizer for Plain {
        fn color_text(&self, assembly: &str, config: &ColorizerConfig) -> Result<String, RenderError> {
            Ok(assembly
                .lines()
                .map(|line| format!("{}{}{}", config.pre_line, line, config.post_line))
                .collect())
        }
    }

    struct Broken;

    impl Colorizer for Broken {
        fn color_text(&self, _: &str, _: &ColorizerConfig) -> Result<String, RenderError> {
            Err(RenderError::Colorizer("bad token".to_string()))
        }
    }

    fn orchestrator_with(colorizer: Box<dyn Colorizer>) -> (CompileOrchestrator, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(NaiveTime::from_hms_opt(14, 3, 9).unwrap()));
        let factory_clock = Rc::clone(&clock);
        let factory = move |request: CompileRequest| -> Box<dyn Compiler> {
            Box::new(ScriptedCompiler {
                source: request.source_code,
                clock: Rc::clone(&factory_clock),
                compiled: false,
            })
        };
        let orchestrator = CompileOrchestrator::new(Box::new(factory), colorizer, Box::new(Rc::clone(&clock)));
        (orchestrator, clock)
    }

    fn orchestrator() -> (CompileOrchestrator, Rc<ManualClock>) {
        orchestrator_with(Box::new(Plain))
    }

    #[test]
    fn test_success_updates_view_status_and_modal() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("long a;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);

        match outcome {
            CompileOutcome::Success(ref success) => {
                assert_eq!(success.assembly_text, "PSH $a\nFIN");
                assert_eq!(success.machine_code.hash_id, "42");
                assert_eq!(success.elapsed_ms, 12);
            }
            _ => panic!("expected success"),
        }
        assert_eq!(orch.assembly().markup(), "PSH $a<br>FIN<br>");
        assert_eq!(orch.assembly().plain_text(), "PSH $a\nFIN");

        let summary = "Compile successful!!!\nDone at 14:03:09 in 12 ms.\nMachine code hash ID: 42";
        assert!(notes.is_visible(ModalKind::Success));
        assert_eq!(notes.modal_text(ModalKind::Success), Some(summary));
        assert!(notes.status().starts_with(summary));
        assert!(notes.status().contains("\n\n{\n    \"MachineCodeHashId\": \"42\""));
        assert!(notes.status().contains("\"ByteCode\": \"0102\""));
    }

    #[test]
    fn test_failure_with_line_decorates_and_schedules_removal() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("fail: At line: 2. Unexpected token\nlong b;\nlong c;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);
        let failure = match outcome {
            CompileOutcome::Failure(failure) => failure,
            _ => panic!("expected failure"),
        };

        assert_eq!(failure.source_line, Some(2));
        let handle = failure.decoration.unwrap();
        assert_eq!(editor.decorations().classes_for_line(1), vec!["asmError"]);
        assert_eq!(editor.scroll_row(), 1);
        assert_eq!(scheduler.deadline(&Job::Clear(handle)), Some(ERROR_DECORATION_MS));
        assert_eq!(orch.error_decoration(), Some(handle));

        let message = "Compile failed\n\nAt line: 2. Unexpected token";
        assert_eq!(notes.modal_text(ModalKind::Error), Some(message));
        assert!(notes.is_visible(ModalKind::Error));
        assert_eq!(notes.status(), format!("{}\n\nat compile", message));
        assert!(orch.assembly().is_empty());
    }

    #[test]
    fn test_failure_without_line_leaves_editor_alone() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("fail: Something broke");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);

        assert!(!outcome.is_success());
        assert!(editor.decorations().is_empty());
        assert_eq!(scheduler.pending_count(), 0);
        assert!(notes.status().starts_with("Compile failed\n\nSomething broke"));
    }

    #[test]
    fn test_error_line_beyond_buffer_is_tolerated() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("fail: At line: 40. Oops");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        match orch.run_compile(&mut editor, &mut scheduler, &mut notes) {
            CompileOutcome::Failure(failure) => {
                assert_eq!(failure.source_line, Some(40));
                assert_eq!(failure.decoration, None);
            }
            _ => panic!("expected failure"),
        }
        assert!(editor.decorations().is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_failure_clears_previous_assembly() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("long a;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        orch.run_compile(&mut editor, &mut scheduler, &mut notes);
        assert!(!orch.assembly().is_empty());

        editor.set_text("fail: At line: 1. bad");
        orch.run_compile(&mut editor, &mut scheduler, &mut notes);
        assert!(orch.assembly().is_empty());
    }

    #[test]
    fn test_new_compile_clears_stale_error_decoration() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("fail: At line: 1. bad\nlong b;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let first = match orch.run_compile(&mut editor, &mut scheduler, &mut notes) {
            CompileOutcome::Failure(failure) => failure.decoration.unwrap(),
            _ => panic!("expected failure"),
        };

        editor.move_to_end();
        editor.type_text("x");
        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);
        assert!(!outcome.is_success());
        assert!(editor.decorations().get(first).is_none());
        assert!(!scheduler.is_scheduled(&Job::Clear(first)));
        assert_eq!(editor.decorations().len(), 1);
    }

    #[test]
    fn test_clear_only_removes_own_handle() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("long a;\nlong b;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let other = editor.decorate_line(1, "asmError").unwrap();
        editor.set_text("fail: At line: 1. bad\nlong b;");
        let other_after_reset = editor.decorate_line(1, "mark").unwrap();

        let mine = match orch.run_compile(&mut editor, &mut scheduler, &mut notes) {
            CompileOutcome::Failure(failure) => failure.decoration.unwrap(),
            _ => panic!("expected failure"),
        };

        orch.clear_error_decoration(&mut editor, other);
        assert_eq!(orch.error_decoration(), Some(mine));

        orch.clear_error_decoration(&mut editor, mine);
        assert_eq!(orch.error_decoration(), None);
        assert!(editor.decorations().get(mine).is_none());
        assert!(editor.decorations().get(other_after_reset).is_some());
    }

    #[test]
    fn test_colorizer_failure_is_reported_not_raised() {
        let (mut orch, _clock) = orchestrator_with(Box::new(Broken));
        let mut editor = EditorCore::with_text("long a;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);

        assert!(!outcome.is_success());
        assert!(notes.status().contains("Colorizer failed: bad token"));
        assert!(notes.is_visible(ModalKind::Error));
        assert!(orch.assembly().is_empty());
    }

    #[test]
    fn test_missing_descriptor_is_a_failure() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("nodesc");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);
        assert!(!outcome.is_success());
        assert_eq!(notes.status(), "Compile failed\n\nno descriptor");
    }

    #[test]
    fn test_attempt_records_source_and_outcome() {
        let (mut orch, clock) = orchestrator();
        clock.set(1_000);
        let mut editor = EditorCore::with_text("long a;");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        orch.run_compile(&mut editor, &mut scheduler, &mut notes);

        let attempt = orch.last_attempt().unwrap();
        assert_eq!(attempt.source, "long a;");
        assert_eq!(attempt.started_ms, 1_000);
        assert!(attempt.outcome.as_ref().unwrap().is_success());
    }

    #[test]
    fn test_missing_modal_surfaces_do_not_break_compile() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("fail: At line: 1. bad");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::with_layer(services_notification::ModalLayer {
            overlay: None,
            success: services_notification::ModalSurface::missing(),
            error: services_notification::ModalSurface::missing(),
        });

        let outcome = orch.run_compile(&mut editor, &mut scheduler, &mut notes);
        assert!(!outcome.is_success());
        assert!(notes.status().starts_with("Compile failed"));
        assert_eq!(editor.decorations().len(), 1);
    }

    #[test]
    fn test_startup_self_check_passes() {
        let (mut orch, _clock) = orchestrator();
        let mut notes = NotificationController::new();

        let report = orch.startup_self_check(&mut notes);
        assert_eq!(report.verdict, SelfCheck::Passed);
        assert_eq!(report.compiler_version, "2.0");
        assert_eq!(notes.status(), "Start up test done!");
    }

    #[test]
    fn test_self_check_messages() {
        assert_eq!(SelfCheck::Failed.message(), "Start up test failed...");
        assert_eq!(SelfCheck::Crashed.message(), "Start up test crashed...");
    }

    #[test]
    fn test_compile_logs_entries() {
        let (mut orch, _clock) = orchestrator();
        let mut editor = EditorCore::with_text("fail: At line: 1. bad");
        let mut scheduler: JobScheduler<Job> = JobScheduler::new();
        let mut notes = NotificationController::new();

        orch.run_compile(&mut editor, &mut scheduler, &mut notes);

        let entries = orch.drain_log();
        let failed = entries
            .iter()
            .find(|e| e.message == "compile failed")
            .unwrap();
        assert_eq!(failed.level, LogLevel::Warn);
        assert_eq!(failed.field("line"), Some("1"));
        assert!(orch.log().is_empty());
    }
}
