//! The external compiler contract

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::colorizer::RenderError;

/// Language tag sent with every compile request
pub const SOURCE_LANGUAGE: &str = "C";

/// Input for one compiler instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub language: String,
    pub source_code: String,
}

impl CompileRequest {
    /// Request for a C source text
    pub fn c(source_code: impl Into<String>) -> Self {
        Self {
            language: SOURCE_LANGUAGE.to_string(),
            source_code: source_code.into(),
        }
    }
}

/// Error raised by the compiler
///
/// The message may start with `At line: N` to point at a source row.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl From<RenderError> for CompileError {
    fn from(err: RenderError) -> Self {
        Self::new(err.to_string())
    }
}

/// Structured description of the generated machine code
///
/// Only the hash identifier is interpreted; every other field is kept as
/// the compiler produced it so it can be shown for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineCode {
    #[serde(rename = "MachineCodeHashId")]
    pub hash_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MachineCode {
    pub fn new(hash_id: impl Into<String>) -> Self {
        Self {
            hash_id: hash_id.into(),
            fields: Map::new(),
        }
    }

    /// Adds a descriptor field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Serializes the descriptor as JSON indented by four spaces
    pub fn to_pretty_json(&self) -> Result<String, RenderError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| RenderError::Descriptor(e.to_string()))?;
        String::from_utf8(out).map_err(|e| RenderError::Descriptor(e.to_string()))
    }
}

/// One compiler instance, bound to a single source text
pub trait Compiler {
    /// Compiles the source given at construction
    fn compile(&mut self) -> Result<(), CompileError>;

    /// Assembly listing; only valid after a successful `compile`
    fn assembly_code(&self) -> Result<String, CompileError>;

    /// Machine-code descriptor; only valid after a successful `compile`
    fn machine_code(&self) -> Result<MachineCode, CompileError>;

    /// Version string of the compiler
    fn compiler_version(&self) -> String;
}

/// Builds compiler instances
pub trait CompilerFactory {
    fn create(&self, request: CompileRequest) -> Box<dyn Compiler>;
}

impl<F> CompilerFactory for F
where
    F: Fn(CompileRequest) -> Box<dyn Compiler>,
{
    fn create(&self, request: CompileRequest) -> Box<dyn Compiler> {
        self(request)
    }
}
