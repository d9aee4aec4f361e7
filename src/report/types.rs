//! Shared types for run, inspect and digest output.

use crate::fingerprint::{RenameRecord, SkippedModule};
use crate::paths::PathTable;
use crate::pipeline::ProcessOutput;
use serde::Serialize;
use std::path::Path;

/// Summary of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// RFC 3339 UTC timestamp
    pub generated_at: String,
    pub input: String,
    pub output: String,
    pub dry_run: bool,
    pub algorithm: String,
    pub renamed: usize,
    pub skipped: usize,
    pub renames: Vec<RenameRecord>,
    pub skipped_modules: Vec<SkippedModule>,
    pub paths: PathTable,
}

impl RunReport {
    pub fn new(
        processed: &ProcessOutput,
        input: &Path,
        output: &Path,
        dry_run: bool,
        algorithm: impl ToString,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            input: input.display().to_string(),
            output: output.display().to_string(),
            dry_run,
            algorithm: algorithm.to_string(),
            renamed: processed.renames.len(),
            skipped: processed.skipped.len(),
            renames: processed.renames.clone(),
            skipped_modules: processed.skipped.clone(),
            paths: processed.paths.clone(),
        }
    }
}

/// What a bootstrap declares, without touching the filesystem.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub input: String,
    pub paths: PathTable,
    pub dependencies: Vec<String>,
    pub callback_field: String,
    pub callback_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_error: Option<String>,
}

/// Digest of one file.
#[derive(Debug, Clone, Serialize)]
pub struct DigestEntry {
    pub file: String,
    pub digest: String,
}
