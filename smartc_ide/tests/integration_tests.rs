//! Integration tests for the smartc_ide host runtime

use compile_orchestrator::{
    Colorizer, ColorizerConfig, CompileError, CompileOrchestrator, CompileRequest, Compiler,
    MachineCode, ManualClock, RenderError, SELF_CHECK_HASH,
};
use editor_core::EditorBridge;
use services_notification::ModalKind;
use services_persistence::KeyValueStore;
use smartc_ide::{
    Button, FileStore, FontTheme, HostMode, HostRuntime, HostRuntimeConfig, HostStore, Session,
    SessionConfig,
};
use std::path::Path;
use tempfile::TempDir;

/// Reports `At line: N` for the first row containing `bad`
struct LineCompiler {
    source: String,
}

impl Compiler for LineCompiler {
    fn compile(&mut self) -> Result<(), CompileError> {
        match self.source.lines().position(|l| l.contains("bad")) {
            Some(row) => Err(CompileError::new(format!(
                "At line: {}. Invalid statement",
                row + 1
            ))
            .with_stack("parser.rs:12")),
            None => Ok(()),
        }
    }

    fn assembly_code(&self) -> Result<String, CompileError> {
        Ok(format!("^comment {} lines\nFIN", self.source.lines().count()))
    }

    fn machine_code(&self) -> Result<MachineCode, CompileError> {
        if self.source.starts_with("#pragma version dev") {
            Ok(MachineCode::new(SELF_CHECK_HASH))
        } else {
            Ok(MachineCode::new("1234").with_field("ByteCode", "0102"))
        }
    }

    fn compiler_version(&self) -> String {
        "2.1".to_string()
    }
}

struct Plain;

impl Colorizer for Plain {
    fn color_text(&self, asm: &str, _config: &ColorizerConfig) -> Result<String, RenderError> {
        Ok(asm.to_string())
    }
}

fn file_runtime(path: &Path, script: &str) -> HostRuntime {
    let factory = |request: CompileRequest| -> Box<dyn Compiler> {
        Box::new(LineCompiler {
            source: request.source_code,
        })
    };
    let orchestrator = CompileOrchestrator::new(
        Box::new(factory),
        Box::new(Plain),
        Box::new(ManualClock::default()),
    );
    let store = HostStore::File(FileStore::open(path).unwrap());
    let session = Session::new(SessionConfig::default(), store, orchestrator);

    let config = HostRuntimeConfig {
        mode: HostMode::Script,
        script: Some(script.to_string()),
        ..HostRuntimeConfig::default()
    };
    HostRuntime::with_session(config, session).unwrap()
}

#[test]
fn test_scripted_compile_session() {
    let dir = TempDir::new().unwrap();
    let script = r#"
        # Broken program first
        "long a;\nbad b;"
        F4
    "#;

    let mut runtime = file_runtime(&dir.path().join("store.json"), script);
    runtime.run().unwrap();

    let session = runtime.session();
    assert_eq!(runtime.step_count(), 2);
    assert!(session.notifications().is_visible(ModalKind::Error));
    assert_eq!(
        session.notifications().status(),
        "Compile failed\n\nAt line: 2. Invalid statement\n\nparser.rs:12"
    );
    assert_eq!(session.editor().decorations().classes_for_line(1), vec!["asmError"]);
    assert_eq!(session.editor().scroll_row(), 1);
}

#[test]
fn test_fix_and_recompile() {
    let dir = TempDir::new().unwrap();
    let script = r#"
        "long a;\nbad b;"
        compile
        dismiss error
        load
        "long a;\nlong b;"
        compile
    "#;

    let mut runtime = file_runtime(&dir.path().join("store.json"), script);
    runtime.run().unwrap();

    let session = runtime.session();
    assert!(session.editor().decorations().is_empty());
    assert!(session.notifications().is_visible(ModalKind::Success));
    assert!(!session.notifications().is_visible(ModalKind::Error));
    assert_eq!(
        session.notifications().modal_text(ModalKind::Success),
        Some("Compile successful!!!\nDone at 00:00:00 in 0 ms.\nMachine code hash ID: 1234")
    );
    assert!(session
        .notifications()
        .status()
        .ends_with("{\n    \"MachineCodeHashId\": \"1234\",\n    \"ByteCode\": \"0102\"\n}"));
    assert_eq!(session.orchestrator().assembly().plain_text(), "^comment 2 lines\nFIN");
    assert_eq!(session.button_label(Button::Load), "Loaded!");
}

#[test]
fn test_error_highlight_expires_after_ten_seconds() {
    let dir = TempDir::new().unwrap();
    let script = r#"
        "bad"
        compile
        wait 9999ms
    "#;

    let mut runtime = file_runtime(&dir.path().join("store.json"), script);
    runtime.run().unwrap();
    assert_eq!(runtime.session().editor().decorations().len(), 1);

    runtime.session_mut().advance_time(1);
    assert!(runtime.session().editor().decorations().is_empty());
}

#[test]
fn test_save_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut first = file_runtime(&path, "\"long a;\"\nF2\nnostalgic on");
    first.run().unwrap();
    assert_eq!(first.session().button_label(Button::Save), "Saved!");

    let mut second = file_runtime(&path, "wait 1ms");
    second.run().unwrap();
    assert_eq!(second.editor_text(), "long a;");
    assert_eq!(second.session().font(), FontTheme::Nostalgic);
    assert!(second.session().autosave_running());
}

#[test]
fn test_autosave_writes_store_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut runtime = file_runtime(&path, "\"long autosaved;\"\nwait 15s");
    runtime.run().unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get_item("program").as_deref(), Some("long autosaved;"));
}

#[test]
fn test_disabled_autosave_skips_restore() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut first = file_runtime(&path, "\"long a;\"\nsave\nautosave off\n\"long b;\"\nwait 30s");
    first.run().unwrap();
    assert!(!first.session().autosave_running());

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get_item("program").as_deref(), Some("long a;"));
    assert_eq!(store.get_item("disableAutoSave").as_deref(), Some("true"));

    let mut second = file_runtime(&path, "wait 1ms");
    second.run().unwrap();
    assert_eq!(second.editor_text(), "");
    assert!(!second.session().autosave_running());

    second.session_mut().load();
    assert_eq!(second.session().editor().text(), "long a;");
}

#[test]
fn test_copy_assembly() {
    let dir = TempDir::new().unwrap();
    let mut runtime = file_runtime(&dir.path().join("store.json"), "\"long a;\"\nF4\ncopy");
    runtime.run().unwrap();

    assert_eq!(runtime.session().clipboard(), Some("^comment 1 lines\nFIN"));
}

#[cfg(unix)]
#[test]
fn test_process_compiler_startup() {
    let dir = TempDir::new().unwrap();
    let response = format!(
        r#"{{"assemblyCode":"FIN","machineCode":{{"MachineCodeHashId":"{}"}},"compilerVersion":"2.1"}}"#,
        SELF_CHECK_HASH
    );
    let config = HostRuntimeConfig {
        mode: HostMode::Script,
        script: Some("F1".to_string()),
        store_path: Some(dir.path().join("store.json")),
        compiler: Some(
            smartc_ide::CompilerCommand::new("sh")
                .with_args(["-c".to_string(), format!("cat > /dev/null; printf '%s' '{}'", response)]),
        ),
        help_url: Some("https://example.invalid/help".to_string()),
        ..HostRuntimeConfig::default()
    };

    let mut runtime = HostRuntime::new(config).unwrap();
    runtime.run().unwrap();

    let session = runtime.session();
    assert_eq!(session.title(), "SmartC IDE 2.1");
    assert_eq!(session.notifications().status(), "Start up test done!");
    assert_eq!(session.opened_urls(), ["https://example.invalid/help".to_string()]);
}
