//! Core types shared across the fingerprinting pipeline.

/// ModuleName: logical name a module is registered under in the path table
pub type ModuleName = String;

/// ModulePath: module location relative to a root, without the file extension
pub type ModulePath = String;

/// Digest: truncated lowercase hex content hash embedded in renamed files
pub type Digest = String;
