//! Workspace-relative pipeline settings.

pub mod pipeline_settings;
