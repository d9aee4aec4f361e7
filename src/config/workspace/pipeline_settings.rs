//! PipelineSettings and resolve_paths for pipeline inputs and outputs.

use crate::emit::DEFAULT_CALLBACK_FIELD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_input() -> PathBuf {
    PathBuf::from("build-tmp/js/core/appsettings.js")
}

fn default_source_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("build-tmp")
}

fn default_callback_field() -> String {
    DEFAULT_CALLBACK_FIELD.to_string()
}

fn default_extension() -> String {
    "js".to_string()
}

fn default_concurrency() -> usize {
    1
}

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSettings {
    /// Bootstrap file to read (relative to workspace root)
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Rewritten bootstrap destination; None writes over the input
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Root module files are read and hashed from
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Root module files are renamed under
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Dot-separated key path of the callback written as source
    #[serde(default = "default_callback_field")]
    pub callback_field: String,

    /// Module file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Fail the run when a module file is missing
    #[serde(default)]
    pub strict_missing: bool,

    /// Compute names and output without renaming or writing
    #[serde(default)]
    pub dry_run: bool,

    /// Modules hashed at once; 1 runs sequentially
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Filesystem locations for a run, resolved against the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
}

impl PipelineSettings {
    /// Resolve relative settings against `workspace_root`; absolute ones are kept.
    pub fn resolve_paths(&self, workspace_root: &Path) -> ResolvedPaths {
        let input = workspace_root.join(&self.input);
        let output = match &self.output {
            Some(path) => workspace_root.join(path),
            None => input.clone(),
        };
        ResolvedPaths {
            input,
            output,
            source_root: workspace_root.join(&self.source_root),
            output_root: workspace_root.join(&self.output_root),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: None,
            source_root: default_source_root(),
            output_root: default_output_root(),
            callback_field: default_callback_field(),
            extension: default_extension(),
            strict_missing: false,
            dry_run: false,
            concurrency: default_concurrency(),
        }
    }
}
