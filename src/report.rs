//! Run reports: what a pipeline run renamed, skipped and wrote.

mod format;
mod types;

pub use format::{
    format_digest_text, format_inspect_text, format_run_report_text, format_section_heading,
};
pub use types::{DigestEntry, InspectReport, RunReport};
