//! Pipeline
//!
//! Sequences extraction, fingerprinting and reserialization for one bootstrap
//! file. The callback field is checked before any module is renamed so a run
//! that cannot produce output leaves the filesystem untouched.

use crate::bootstrap::{self, Bootstrap};
use crate::config::PathstampConfig;
use crate::emit::Emitter;
use crate::error::PipelineError;
use crate::fingerprint::{FingerprintConfig, FingerprintResult, Fingerprinter, RenameRecord, SkippedModule};
use crate::paths::PathTable;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of processing a bootstrap file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// Rewritten bootstrap text
    pub text: String,
    /// Updated path table
    pub paths: PathTable,
    pub renames: Vec<RenameRecord>,
    pub skipped: Vec<SkippedModule>,
}

/// One configured pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    fingerprinter: Fingerprinter,
    emitter: Emitter,
}

impl Pipeline {
    pub fn new(fingerprinter: Fingerprinter, emitter: Emitter) -> Self {
        Self {
            fingerprinter,
            emitter,
        }
    }

    /// Build a pipeline from configuration, resolving roots against `workspace_root`.
    pub fn from_config(config: &PathstampConfig, workspace_root: &Path) -> Self {
        let paths = config.pipeline.resolve_paths(workspace_root);
        let fingerprinter = Fingerprinter::new(FingerprintConfig {
            source_root: paths.source_root,
            output_root: paths.output_root,
            extension: config.pipeline.extension.clone(),
            algorithm: config.digest.algorithm,
            digest_len: config.digest.length,
            dry_run: config.pipeline.dry_run,
            strict_missing: config.pipeline.strict_missing,
            concurrency: config.pipeline.concurrency,
        });
        Self::new(fingerprinter, Emitter::new(&config.pipeline.callback_field))
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    /// Extract and check a bootstrap before anything touches the filesystem.
    fn prepare(&self, source: &str) -> Result<Bootstrap, PipelineError> {
        let bootstrap = bootstrap::extract(source)?;
        self.emitter.resolve_callback(&bootstrap.config)?;
        debug!(
            modules = bootstrap.config.paths().len(),
            dependencies = bootstrap.init.dependencies.len(),
            "Extracted bootstrap"
        );
        Ok(bootstrap)
    }

    fn finish(
        &self,
        bootstrap: &Bootstrap,
        result: FingerprintResult,
    ) -> Result<ProcessOutput, PipelineError> {
        let config = bootstrap.config.with_paths(result.paths.clone());
        let text = self.emitter.emit(&config, &bootstrap.init)?;
        Ok(ProcessOutput {
            text,
            paths: result.paths,
            renames: result.renames,
            skipped: result.skipped,
        })
    }

    /// Process bootstrap source text, fingerprinting modules one at a time.
    pub fn process_source(&self, source: &str) -> Result<ProcessOutput, PipelineError> {
        let bootstrap = self.prepare(source)?;
        let result = self.fingerprinter.fingerprint_all(bootstrap.config.paths())?;
        self.finish(&bootstrap, result)
    }

    /// Process bootstrap source text, fingerprinting modules concurrently.
    pub async fn process_source_async(&self, source: &str) -> Result<ProcessOutput, PipelineError> {
        let bootstrap = self.prepare(source)?;
        let result = self
            .fingerprinter
            .fingerprint_all_concurrent(bootstrap.config.paths())
            .await?;
        self.finish(&bootstrap, result)
    }

    /// Read and process a bootstrap file. Nothing is written.
    ///
    /// With a concurrency above one, fingerprinting runs on a private runtime.
    /// Callers already inside a runtime must use `process_async` instead;
    /// calling this from one is an error.
    pub fn process(&self, input: &Path) -> Result<ProcessOutput, PipelineError> {
        let started = Instant::now();
        info!(input = %input.display(), "Processing bootstrap");
        let concurrent = self.fingerprinter.config().concurrency > 1;
        if concurrent && tokio::runtime::Handle::try_current().is_ok() {
            return Err(PipelineError::Runtime(
                "concurrent processing cannot start a runtime inside another; use process_async"
                    .to_string(),
            ));
        }
        let source = read_source(input)?;

        let output = if concurrent {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|e| PipelineError::Runtime(e.to_string()))?;
            runtime.block_on(self.process_source_async(&source))?
        } else {
            self.process_source(&source)?
        };

        info!(
            renamed = output.renames.len(),
            skipped = output.skipped.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Processed bootstrap"
        );
        Ok(output)
    }

    pub async fn process_async(&self, input: &Path) -> Result<ProcessOutput, PipelineError> {
        let source = read_source(input)?;
        self.process_source_async(&source).await
    }

    /// Process `input` and write the rewritten bootstrap to `output`.
    ///
    /// In dry-run mode the output file is not written.
    pub fn run(&self, input: &Path, output: &Path) -> Result<ProcessOutput, PipelineError> {
        let processed = self.process(input)?;
        if self.fingerprinter.config().dry_run {
            info!(output = %output.display(), "Dry run, bootstrap not written");
        } else {
            write_output(output, &processed.text)?;
            info!(output = %output.display(), "Wrote bootstrap");
        }
        Ok(processed)
    }
}

fn read_source(input: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(input).map_err(|e| PipelineError::io(input, e))
}

/// Write `text` to `path` atomically: a sibling temporary file is written and
/// then renamed over the destination.
pub fn write_output(path: &Path, text: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, text).map_err(|e| PipelineError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        PipelineError::io(path, e)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
