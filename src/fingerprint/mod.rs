//! Fingerprinting
//!
//! Hashes each module file named by the path table, renames it so the digest
//! is part of its file name, and produces the updated path table. Modules whose
//! file cannot be read are dropped from the result unless strict mode is on.

pub mod hasher;
pub mod naming;

use crate::error::FingerprintError;
use crate::paths::{PathEntry, PathTable};
use crate::types::{Digest, ModuleName, ModulePath};
use hasher::{compute_digest, HashAlgorithm};
use naming::{hashed_file_name, hashed_module_path, module_file_name, split_module_path};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Settings for a fingerprinting pass.
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    /// Root the module files are read from
    pub source_root: PathBuf,
    /// Root the module files are renamed in
    pub output_root: PathBuf,
    /// Module file extension, without the dot
    pub extension: String,
    pub algorithm: HashAlgorithm,
    /// Number of hex characters kept from the digest
    pub digest_len: usize,
    /// Compute new names without renaming anything
    pub dry_run: bool,
    /// Fail instead of dropping modules whose file is missing
    pub strict_missing: bool,
    /// Maximum number of modules processed at once by the concurrent pass
    pub concurrency: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            output_root: PathBuf::from("build-tmp"),
            extension: "js".to_string(),
            algorithm: HashAlgorithm::default(),
            digest_len: 8,
            dry_run: false,
            strict_missing: false,
            concurrency: 1,
        }
    }
}

/// A module file that was hashed and renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRecord {
    pub module: ModuleName,
    pub old_path: ModulePath,
    pub new_path: ModulePath,
    pub digest: Digest,
    /// File before the rename
    pub from: PathBuf,
    /// File after the rename
    pub to: PathBuf,
}

/// A module dropped from the path table because its file could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedModule {
    pub module: ModuleName,
    pub path: ModulePath,
    pub file: PathBuf,
    pub reason: String,
}

/// Result of fingerprinting a single path-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    Renamed(RenameRecord),
    Skipped(SkippedModule),
}

/// Merged result of a full pass over the path table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FingerprintResult {
    /// Updated table holding only renamed modules, in declaration order
    pub paths: PathTable,
    pub renames: Vec<RenameRecord>,
    pub skipped: Vec<SkippedModule>,
}

impl FingerprintResult {
    /// Merge per-module outcomes, in path-table order.
    pub fn merge(outcomes: impl IntoIterator<Item = ModuleOutcome>) -> Self {
        let mut result = FingerprintResult::default();
        for outcome in outcomes {
            match outcome {
                ModuleOutcome::Renamed(record) => {
                    result.paths.insert(record.module.clone(), record.new_path.clone());
                    result.renames.push(record);
                }
                ModuleOutcome::Skipped(skipped) => result.skipped.push(skipped),
            }
        }
        result
    }
}

/// Hashes and renames module files.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    config: Arc<FingerprintConfig>,
}

impl Fingerprinter {
    pub fn new(config: FingerprintConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Hash one module file and rename it.
    ///
    /// The file is read from the source root and renamed under the output root,
    /// at the same relative directory.
    pub fn fingerprint_entry(&self, entry: &PathEntry) -> Result<ModuleOutcome, FingerprintError> {
        let (dir, base) = split_module_path(&entry.path);
        let file_name = module_file_name(&base, &self.config.extension);
        let source_file = join_module_dir(&self.config.source_root, &dir).join(&file_name);

        let digest = match std::fs::read(&source_file) {
            Ok(bytes) => compute_digest(&bytes, self.config.algorithm, self.config.digest_len),
            Err(err) => {
                if self.config.strict_missing {
                    return Err(FingerprintError::ModuleFileMissing {
                        module: entry.module.clone(),
                        path: source_file,
                        source: err,
                    });
                }
                warn!(
                    module = %entry.module,
                    file = %source_file.display(),
                    error = %err,
                    "Module file unreadable, dropping module from path table"
                );
                return Ok(ModuleOutcome::Skipped(SkippedModule {
                    module: entry.module.clone(),
                    path: entry.path.clone(),
                    file: source_file,
                    reason: err.to_string(),
                }));
            }
        };

        let output_dir = join_module_dir(&self.config.output_root, &dir);
        let from = output_dir.join(&file_name);
        let to = output_dir.join(hashed_file_name(&digest, &file_name));
        if !self.config.dry_run {
            std::fs::rename(&from, &to).map_err(|source| FingerprintError::Rename {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
        }

        let new_path = hashed_module_path(&dir, &digest, &base);
        debug!(
            module = %entry.module,
            digest = %digest,
            new_path = %new_path,
            dry_run = self.config.dry_run,
            "Fingerprinted module"
        );
        Ok(ModuleOutcome::Renamed(RenameRecord {
            module: entry.module.clone(),
            old_path: entry.path.clone(),
            new_path,
            digest,
            from,
            to,
        }))
    }

    /// Fingerprint every entry in order, one at a time.
    pub fn fingerprint_all(&self, table: &PathTable) -> Result<FingerprintResult, FingerprintError> {
        let outcomes = table
            .iter()
            .map(|entry| self.fingerprint_entry(entry))
            .collect::<Result<Vec<_>, _>>()?;
        let result = FingerprintResult::merge(outcomes);
        info!(
            renamed = result.renames.len(),
            skipped = result.skipped.len(),
            "Fingerprinting complete"
        );
        Ok(result)
    }

    /// Fingerprint entries on the blocking pool, at most `concurrency` at a time.
    ///
    /// Every entry is resolved before outcomes are merged, so the returned table
    /// is in declaration order regardless of completion order.
    pub async fn fingerprint_all_concurrent(
        &self,
        table: &PathTable,
    ) -> Result<FingerprintResult, FingerprintError> {
        let limit = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let tasks = table.to_entries().into_iter().map(|entry| {
            let fingerprinter = self.clone();
            let limit = limit.clone();
            async move {
                let module = entry.module.clone();
                let _permit = limit
                    .acquire_owned()
                    .await
                    .map_err(|e| FingerprintError::Worker {
                        module: module.clone(),
                        reason: e.to_string(),
                    })?;
                tokio::task::spawn_blocking(move || fingerprinter.fingerprint_entry(&entry))
                    .await
                    .map_err(|e| FingerprintError::Worker {
                        module,
                        reason: e.to_string(),
                    })?
            }
        });

        let outcomes = futures::future::join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        let result = FingerprintResult::merge(outcomes);
        info!(
            renamed = result.renames.len(),
            skipped = result.skipped.len(),
            concurrency = self.config.concurrency,
            "Fingerprinting complete"
        );
        Ok(result)
    }
}

/// Join a `/`-separated module directory onto a filesystem root.
///
/// Absolute module directories are treated as relative to the root.
fn join_module_dir(root: &Path, dir: &str) -> PathBuf {
    dir.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}
