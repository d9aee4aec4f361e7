//! CLI Tooling
//!
//! Command-line interface for pipeline runs. Every command is scoped to a
//! workspace root and reads its defaults from the layered configuration.

use crate::bootstrap;
use crate::config::{ConfigLoader, PathstampConfig};
use crate::emit::Emitter;
use crate::error::PipelineError;
use crate::fingerprint::hasher::compute_digest;
use crate::logging::LoggingConfig;
use crate::pipeline::Pipeline;
use crate::report::{
    format_digest_text, format_inspect_text, format_run_report_text, DigestEntry, InspectReport,
    RunReport,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Pathstamp CLI - content fingerprinting for module loader bootstraps
#[derive(Parser, Debug)]
#[command(name = "pathstamp")]
#[command(about = "Rename module files by content digest and rewrite the bootstrap path table")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply the logging flags on top of the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> Result<LoggingConfig, PipelineError> {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.parse()?;
        }
        if let Some(output) = &self.log_output {
            config.output = output.parse()?;
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fingerprint module files and rewrite the bootstrap
    Run {
        /// Bootstrap file to read
        #[arg(long)]
        input: Option<PathBuf>,
        /// Destination for the rewritten bootstrap (default: overwrite input)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Root module files are read from
        #[arg(long)]
        source_root: Option<PathBuf>,
        /// Root module files are renamed under
        #[arg(long)]
        output_root: Option<PathBuf>,
        /// Compute new names and output without renaming or writing
        #[arg(long)]
        dry_run: bool,
        /// Fail when a module file is missing instead of dropping the module
        #[arg(long)]
        strict: bool,
        /// Modules hashed at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show what a bootstrap declares without touching any files
    Inspect {
        /// Bootstrap file to read
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print content digests of files, or of module files under directories
    Digest {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_format(format: &str) -> Result<OutputFormat, PipelineError> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(PipelineError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

/// CLI context holding the workspace root and loaded configuration
pub struct CliContext {
    workspace_root: PathBuf,
    config: PathstampConfig,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let workspace_root =
            dunce::canonicalize(&workspace_root).map_err(|e| PipelineError::io(&workspace_root, e))?;
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &PathstampConfig {
        &self.config
    }

    /// Execute a CLI command, returning the text to print.
    pub fn execute(&self, command: &Commands) -> Result<String, PipelineError> {
        match command {
            Commands::Run {
                input,
                output,
                source_root,
                output_root,
                dry_run,
                strict,
                concurrency,
                format,
            } => {
                let format = parse_format(format)?;
                let mut config = self.config.clone();
                let settings = &mut config.pipeline;
                if let Some(input) = input {
                    settings.input = input.clone();
                }
                if output.is_some() {
                    settings.output = output.clone();
                }
                if let Some(root) = source_root {
                    settings.source_root = root.clone();
                }
                if let Some(root) = output_root {
                    settings.output_root = root.clone();
                }
                settings.dry_run |= *dry_run;
                settings.strict_missing |= *strict;
                if let Some(concurrency) = concurrency {
                    settings.concurrency = *concurrency;
                }
                config.validate()?;
                self.handle_run(&config, format)
            }
            Commands::Inspect { input, format } => {
                let format = parse_format(format)?;
                let input = input
                    .clone()
                    .unwrap_or_else(|| self.config.pipeline.input.clone());
                self.handle_inspect(&self.workspace_root.join(input), format)
            }
            Commands::Digest { paths, format } => {
                let format = parse_format(format)?;
                self.handle_digest(paths, format)
            }
        }
    }

    fn handle_run(
        &self,
        config: &PathstampConfig,
        format: OutputFormat,
    ) -> Result<String, PipelineError> {
        let paths = config.pipeline.resolve_paths(&self.workspace_root);
        let pipeline = Pipeline::from_config(config, &self.workspace_root);
        let processed = pipeline.run(&paths.input, &paths.output)?;
        let report = RunReport::new(
            &processed,
            &paths.input,
            &paths.output,
            config.pipeline.dry_run,
            config.digest.algorithm,
        );
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => Ok(format_run_report_text(&report)),
        }
    }

    fn handle_inspect(&self, input: &Path, format: OutputFormat) -> Result<String, PipelineError> {
        let source = std::fs::read_to_string(input).map_err(|e| PipelineError::io(input, e))?;
        let bootstrap = bootstrap::extract(&source)?;
        let emitter = Emitter::new(&self.config.pipeline.callback_field);
        let callback = emitter.resolve_callback(&bootstrap.config);
        let report = InspectReport {
            input: input.display().to_string(),
            paths: bootstrap.config.paths().clone(),
            dependencies: bootstrap.init.dependencies.clone(),
            callback_field: emitter.callback_field(),
            callback_present: callback.is_ok(),
            callback_error: callback.err().map(|e| e.to_string()),
        };
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => Ok(format_inspect_text(&report)),
        }
    }

    fn handle_digest(&self, paths: &[PathBuf], format: OutputFormat) -> Result<String, PipelineError> {
        let mut entries = Vec::new();
        for path in paths {
            let path = self.workspace_root.join(path);
            for file in self.collect_files(&path)? {
                let bytes = std::fs::read(&file).map_err(|e| PipelineError::io(&file, e))?;
                entries.push(DigestEntry {
                    file: file.display().to_string(),
                    digest: compute_digest(
                        &bytes,
                        self.config.digest.algorithm,
                        self.config.digest.length,
                    ),
                });
            }
        }
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
            OutputFormat::Text => Ok(format_digest_text(&entries)),
        }
    }

    /// A file stands for itself; a directory yields its module files in name order.
    fn collect_files(&self, path: &Path) -> Result<Vec<PathBuf>, PipelineError> {
        if !path.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }
        let extension = self.config.pipeline.extension.as_str();
        let mut files = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(path).to_path_buf();
                PipelineError::io(at, std::io::Error::other(e.to_string()))
            })?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
            {
                files.push(entry.into_path());
            }
        }
        debug!(dir = %path.display(), files = files.len(), "Collected module files");
        Ok(files)
    }
}
