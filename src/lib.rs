//! Pathstamp: Content Fingerprinting for Module Loader Bootstraps
//!
//! Reads the `require.config(...)` / `require(...)` pair out of a bootstrap
//! script, renames every module file in its path table to a content-addressed
//! name, and writes the bootstrap back with the updated table. Function
//! values in the configuration are carried as raw source and written back
//! unquoted.

pub mod bootstrap;
pub mod config;
pub mod emit;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod tooling;
pub mod types;

pub use bootstrap::{extract, Bootstrap};
pub use error::PipelineError;
pub use paths::{PathEntry, PathTable};
pub use pipeline::{Pipeline, ProcessOutput};
