//! Error types for the fingerprinting pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the loader calls out of a bootstrap file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unsupported expression at {line}:{column}: {found}")]
    UnsupportedValue {
        line: usize,
        column: usize,
        found: String,
    },

    #[error("Bootstrap source has no {0} call")]
    MissingCall(&'static str),

    #[error("Invalid arguments to {call}: {reason}")]
    InvalidArguments { call: &'static str, reason: String },

    #[error("Path table entry '{module}' is not a string")]
    NonStringPath { module: String },

    #[error("Path table entry has an empty module name")]
    EmptyModuleName,

    #[error("Path table is not an object")]
    InvalidPathTable,
}

/// Errors raised while hashing and renaming module files
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Module '{module}' file {path} could not be read: {source}")]
    ModuleFileMissing {
        module: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker for module '{module}' did not complete: {reason}")]
    Worker { module: String, reason: String },
}

/// Errors raised while writing the bootstrap back out
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("Callback field '{0}' not found in bootstrap config")]
    CallbackFieldMissing(String),

    #[error("Callback field '{field}' holds {found}, expected function source")]
    CallbackNotFunction { field: String, found: String },
}

/// Top-level error for a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Fingerprinting failed: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Reserialization mismatch: {0}")]
    Reserialization(#[from] EmitError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::ConfigError(err.to_string())
    }
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
