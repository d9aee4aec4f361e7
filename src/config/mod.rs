//! Configuration
//!
//! Layered configuration for pipeline runs: built-in defaults, the global
//! config file, the workspace `pathstamp.toml`, then `PATHSTAMP__*` environment
//! variables.

pub mod facade;
pub mod merge;
pub mod sources;
pub mod workspace;
#[path = "paths/xdg_root.rs"]
pub mod xdg;

pub use facade::ConfigLoader;
pub use workspace::pipeline_settings::{PipelineSettings, ResolvedPaths};

use crate::error::PipelineError;
use crate::fingerprint::hasher::HashAlgorithm;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Workspace config file name
pub const WORKSPACE_CONFIG_FILE: &str = "pathstamp.toml";

/// Digest settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DigestConfig {
    #[serde(default)]
    pub algorithm: HashAlgorithm,

    /// Hex characters kept from the digest
    #[serde(default = "default_digest_length")]
    pub length: usize,
}

fn default_digest_length() -> usize {
    8
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            length: default_digest_length(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathstampConfig {
    #[serde(default)]
    pub pipeline: PipelineSettings,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PathstampConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let max = self.digest.algorithm.hex_len();
        if self.digest.length == 0 || self.digest.length > max {
            return Err(PipelineError::ConfigError(format!(
                "digest.length must be between 1 and {} for {}, got {}",
                max, self.digest.algorithm, self.digest.length
            )));
        }
        if self.pipeline.extension.is_empty() || self.pipeline.extension.contains('/') {
            return Err(PipelineError::ConfigError(format!(
                "pipeline.extension '{}' is not a valid file extension",
                self.pipeline.extension
            )));
        }
        if self.pipeline.callback_field.split('.').any(str::is_empty) {
            return Err(PipelineError::ConfigError(format!(
                "pipeline.callback_field '{}' is not a valid key path",
                self.pipeline.callback_field
            )));
        }
        if self.pipeline.concurrency == 0 {
            return Err(PipelineError::ConfigError(
                "pipeline.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
