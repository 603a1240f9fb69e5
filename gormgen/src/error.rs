//! Error types for gormgen

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::codegen::TemplateError;

/// Result type alias for gormgen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Rendering phase of a generated file, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Header,
    Struct,
    ObjectApi,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Header => "header",
            Phase::Struct => "struct",
            Phase::ObjectApi => "object api",
        })
    }
}

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[error("[{table}] Failed to create output file {}: {source}", path.display())]
    CreateOutput {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{table}] Failed to render {phase} section: {source}")]
    Render {
        table: String,
        phase: Phase,
        #[source]
        source: TemplateError,
    },

    #[error("[{table}] Failed to write output: {source}")]
    WriteOutput {
        table: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[{table}] Multiple primary key columns: {}", columns.join(", "))]
    AmbiguousPrimaryKey { table: String, columns: Vec<String> },

    #[error("Formatter `{command}` failed: {message}")]
    Format { command: String, message: String },

    #[error("{} table(s) failed to generate: {}", .0.len(), summarize(.0))]
    Tables(Vec<CodegenError>),
}

impl CodegenError {
    /// Name of the table this error belongs to, if it is a per-table failure
    pub fn table(&self) -> Option<&str> {
        match self {
            CodegenError::CreateOutput { table, .. }
            | CodegenError::Render { table, .. }
            | CodegenError::WriteOutput { table, .. }
            | CodegenError::AmbiguousPrimaryKey { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Rendering phase that failed, for render errors
    pub fn phase(&self) -> Option<Phase> {
        match self {
            CodegenError::Render { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

fn summarize(errors: &[CodegenError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(err: serde_json::Error) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
