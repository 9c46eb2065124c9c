//! # Compiler Bridge
//!
//! Runs the compiler as a child process. The request goes to its stdin as
//! JSON and one JSON response is read back from stdout:
//!
//! ```text
//! -> {"language":"C","sourceCode":"long a;"}
//! <- {"assemblyCode":"...","machineCode":{"MachineCodeHashId":"..."},"compilerVersion":"2.1"}
//! <- {"error":{"message":"At line: 1. ...","stack":"..."},"compilerVersion":"2.1"}
//! ```

use compile_orchestrator::{CompileError, CompileRequest, Compiler, CompilerFactory, MachineCode};
use serde::Deserialize;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

const UNKNOWN_VERSION: &str = "unknown";

/// One compiler response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerResponse {
    #[serde(default)]
    assembly_code: Option<String>,
    #[serde(default)]
    machine_code: Option<MachineCode>,
    #[serde(default)]
    compiler_version: Option<String>,
    #[serde(default)]
    error: Option<CompileError>,
}

/// Command line used to start the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CompilerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Splits a command line on whitespace
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).with_args(words))
    }
}

/// Builds [`ProcessCompiler`]s for one command line
#[derive(Debug, Clone)]
pub struct ProcessCompilerFactory {
    command: CompilerCommand,
}

impl ProcessCompilerFactory {
    pub fn new(command: CompilerCommand) -> Self {
        Self { command }
    }
}

impl CompilerFactory for ProcessCompilerFactory {
    fn create(&self, request: CompileRequest) -> Box<dyn Compiler> {
        Box::new(ProcessCompiler::new(self.command.clone(), request))
    }
}

/// Compiler running in a child process
#[derive(Debug)]
pub struct ProcessCompiler {
    command: CompilerCommand,
    request: CompileRequest,
    output: Option<(String, MachineCode)>,
    version: Option<String>,
}

impl ProcessCompiler {
    pub fn new(command: CompilerCommand, request: CompileRequest) -> Self {
        Self {
            command,
            request,
            output: None,
            version: None,
        }
    }

    fn exchange(&self) -> Result<CompilerResponse, CompileError> {
        let payload = serde_json::to_vec(&self.request)
            .map_err(|e| CompileError::new(format!("Could not encode request: {}", e)))?;

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompileError::new(format!(
                    "Could not start compiler '{}': {}",
                    self.command.program, e
                ))
            })?;

        // The compiler may answer before reading all of its input, so stdin
        // is fed from its own thread while stdout is collected.
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&payload)));

        let output = child
            .wait_with_output()
            .map_err(|e| CompileError::new(format!("Compiler did not finish: {}", e)))?;
        let sent = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "writer panicked"))),
            None => Ok(()),
        };
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let decoded = serde_json::from_slice::<CompilerResponse>(&output.stdout);
        let error = match (decoded, sent) {
            (Ok(response), _) => return Ok(response),
            (Err(_), Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => {
                CompileError::new(format!("Could not send source: {}", e))
            }
            (Err(e), _) => CompileError::new(format!(
                "Compiler returned an unreadable response ({}): {}",
                output.status, e
            )),
        };
        if stderr.is_empty() {
            Err(error)
        } else {
            Err(error.with_stack(stderr))
        }
    }
}

impl Compiler for ProcessCompiler {
    fn compile(&mut self) -> Result<(), CompileError> {
        self.output = None;
        let response = self.exchange()?;
        if response.compiler_version.is_some() {
            self.version = response.compiler_version;
        }

        if let Some(error) = response.error {
            return Err(error);
        }

        match (response.assembly_code, response.machine_code) {
            (Some(assembly), Some(machine_code)) => {
                self.output = Some((assembly, machine_code));
                Ok(())
            }
            _ => Err(CompileError::new(
                "Compiler response is missing assembly or machine code",
            )),
        }
    }

    fn assembly_code(&self) -> Result<String, CompileError> {
        self.output
            .as_ref()
            .map(|(assembly, _)| assembly.clone())
            .ok_or_else(|| CompileError::new("No assembly: program was not compiled"))
    }

    fn machine_code(&self) -> Result<MachineCode, CompileError> {
        self.output
            .as_ref()
            .map(|(_, code)| code.clone())
            .ok_or_else(|| CompileError::new("No machine code: program was not compiled"))
    }

    fn compiler_version(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn shell(script: &str) -> ProcessCompilerFactory {
        ProcessCompilerFactory::new(
            CompilerCommand::new("sh").with_args(["-c", script]),
        )
    }

    #[test]
    fn test_parse_command_line() {
        let command = CompilerCommand::parse("node  smartc-cli.js --json").unwrap();
        assert_eq!(command.program, "node");
        assert_eq!(command.args, vec!["smartc-cli.js", "--json"]);
        assert!(CompilerCommand::parse("   ").is_none());
    }

    #[test]
    fn test_response_decoding() {
        let json = r#"{
            "assemblyCode": "FIN",
            "machineCode": {"MachineCodeHashId": "5", "ByteCode": ""},
            "compilerVersion": "2.1"
        }"#;
        let response: CompilerResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.assembly_code.as_deref(), Some("FIN"));
        assert_eq!(response.machine_code.unwrap().hash_id, "5");
        assert!(response.error.is_none());
    }

    #[test]
    fn test_missing_program_is_compile_error() {
        let factory = ProcessCompilerFactory::new(CompilerCommand::new(
            "/nonexistent/smartc-compiler",
        ));
        let mut compiler = factory.create(CompileRequest::c("long a;"));

        let err = compiler.compile().unwrap_err();
        assert!(err.message.starts_with("Could not start compiler"));
        assert!(compiler.assembly_code().is_err());
        assert_eq!(compiler.compiler_version(), "unknown");
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_exchange() {
        let factory = shell(
            r#"cat > /dev/null; printf '%s' '{"assemblyCode":"FIN","machineCode":{"MachineCodeHashId":"7"},"compilerVersion":"2.1"}'"#,
        );
        let mut compiler = factory.create(CompileRequest::c("long a;"));

        compiler.compile().unwrap();
        assert_eq!(compiler.assembly_code().unwrap(), "FIN");
        assert_eq!(compiler.machine_code().unwrap().hash_id, "7");
        assert_eq!(compiler.compiler_version(), "2.1");
    }

    #[cfg(unix)]
    #[test]
    fn test_error_response() {
        let factory = shell(
            r#"cat > /dev/null; printf '%s' '{"error":{"message":"At line: 1. Bad","stack":"trace"},"compilerVersion":"2.1"}'"#,
        );
        let mut compiler = factory.create(CompileRequest::c("long a"));

        let err = compiler.compile().unwrap_err();
        assert_eq!(err.message, "At line: 1. Bad");
        assert_eq!(err.stack.as_deref(), Some("trace"));
        assert_eq!(compiler.compiler_version(), "2.1");
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_response() {
        let factory = shell("cat > /dev/null; echo boom >&2; echo not-json");
        let mut compiler = factory.create(CompileRequest::c("long a;"));

        let err = compiler.compile().unwrap_err();
        assert!(err.message.starts_with("Compiler returned an unreadable response"));
        assert_eq!(err.stack.as_deref(), Some("boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_answer_without_reading_source() {
        let factory = shell(
            r#"printf '%s' '{"error":{"message":"At line: 1. Source too large"}}'; exec 0<&-"#,
        );
        let source = "long a;\n".repeat(250_000);
        let mut compiler = factory.create(CompileRequest::c(&source));

        let err = compiler.compile().unwrap_err();
        assert_eq!(err.message, "At line: 1. Source too large");
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_exit_without_reading_source() {
        let factory = shell("exec 0<&-; echo boom >&2");
        let source = "long a;\n".repeat(250_000);
        let mut compiler = factory.create(CompileRequest::c(&source));

        let err = compiler.compile().unwrap_err();
        assert!(err.message.starts_with("Compiler returned an unreadable response"));
        assert_eq!(err.stack.as_deref(), Some("boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_request_reaches_stdin() {
        let factory = shell(
            r#"if grep -q '"sourceCode":"long a;"'; then printf '%s' '{"assemblyCode":"long a;","machineCode":{"MachineCodeHashId":"1"}}'; else printf '%s' '{"error":{"message":"wrong request"}}'; fi"#,
        );
        let mut compiler = factory.create(CompileRequest::c("long a;"));

        compiler.compile().unwrap();
        assert_eq!(compiler.assembly_code().unwrap(), "long a;");
    }
}
