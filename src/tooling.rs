//! Tooling & Integration Layer
//!
//! Command-line entry points over the pipeline, for build scripts and CI.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
