//! Integration tests for the bootstrap fingerprinting pipeline

mod cli_contracts;
mod extraction;
mod pipeline_roundtrip;
mod support;
