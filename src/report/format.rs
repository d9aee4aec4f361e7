//! Format run, inspect and digest reports as text.

use super::types::{DigestEntry, InspectReport, RunReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Format a run report as human-readable text.
pub fn format_run_report_text(report: &RunReport) -> String {
    let mut out = String::new();
    let heading = if report.dry_run {
        "Fingerprint (dry run)"
    } else {
        "Fingerprint"
    };
    out.push_str(&format!("{}\n\n", format_section_heading(heading)));
    out.push_str(&format!("  Input: {}\n", report.input));
    out.push_str(&format!("  Output: {}\n", report.output));
    out.push_str(&format!("  Digest: {}\n", report.algorithm));
    out.push_str(&format!("  Generated: {}\n\n", report.generated_at));

    if !report.renames.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Renamed modules")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Module", "Old path", "New path", "Digest"]);
        for row in &report.renames {
            table.add_row(vec![
                row.module.clone(),
                row.old_path.clone(),
                row.new_path.clone(),
                row.digest.clone(),
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    if !report.skipped_modules.is_empty() {
        out.push_str(&format!(
            "{}\n\n",
            format_section_heading("Dropped modules (file missing)")
        ));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Module", "Path", "Reason"]);
        for row in &report.skipped_modules {
            table.add_row(vec![row.module.clone(), row.path.clone(), row.reason.clone()]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str(&format!(
        "Total: {} renamed, {} dropped.\n",
        report.renamed, report.skipped
    ));
    out
}

/// Format an inspect report as human-readable text.
pub fn format_inspect_text(report: &InspectReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Bootstrap")));
    out.push_str(&format!("  Input: {}\n", report.input));
    let callback = if report.callback_present {
        "function".to_string()
    } else {
        report
            .callback_error
            .clone()
            .unwrap_or_else(|| "missing".to_string())
    };
    out.push_str(&format!("  {}: {}\n", report.callback_field, callback));
    out.push_str(&format!(
        "  Dependencies: {}\n\n",
        if report.dependencies.is_empty() {
            "-".to_string()
        } else {
            report.dependencies.join(", ")
        }
    ));

    out.push_str(&format!("{}\n\n", format_section_heading("Paths")));
    if report.paths.is_empty() {
        out.push_str("No paths declared.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Module", "Path"]);
    for entry in report.paths.iter() {
        table.add_row(vec![entry.module.clone(), entry.path.clone()]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} modules.\n", report.paths.len()));
    out
}

/// Format file digests, one `digest  file` line each.
pub fn format_digest_text(entries: &[DigestEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}  {}\n", e.digest, e.file))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{RenameRecord, SkippedModule};
    use crate::paths::{PathEntry, PathTable};
    use std::path::PathBuf;

    fn sample_report() -> RunReport {
        RunReport {
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            input: "in.js".to_string(),
            output: "out.js".to_string(),
            dry_run: false,
            algorithm: "sha1".to_string(),
            renamed: 1,
            skipped: 1,
            renames: vec![RenameRecord {
                module: "a".to_string(),
                old_path: "mods/a".to_string(),
                new_path: "mods/0123abcd.a".to_string(),
                digest: "0123abcd".to_string(),
                from: PathBuf::from("mods/a.js"),
                to: PathBuf::from("mods/0123abcd.a.js"),
            }],
            skipped_modules: vec![SkippedModule {
                module: "b".to_string(),
                path: "mods/b".to_string(),
                file: PathBuf::from("mods/b.js"),
                reason: "not found".to_string(),
            }],
            paths: PathTable::from_entries(vec![PathEntry::new("a", "mods/0123abcd.a")]),
        }
    }

    #[test]
    fn test_run_report_text_lists_renames_and_drops() {
        let text = format_run_report_text(&sample_report());
        assert!(text.contains("mods/0123abcd.a"));
        assert!(text.contains("not found"));
        assert!(text.contains("Total: 1 renamed, 1 dropped."));
    }

    #[test]
    fn test_run_report_json_contract() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["renamed"], 1);
        assert_eq!(json["paths"]["a"], "mods/0123abcd.a");
        assert_eq!(json["renames"][0]["digest"], "0123abcd");
        assert_eq!(json["skipped_modules"][0]["module"], "b");
    }

    #[test]
    fn test_digest_text() {
        let text = format_digest_text(&[DigestEntry {
            file: "a.js".to_string(),
            digest: "0123abcd".to_string(),
        }]);
        assert_eq!(text, "0123abcd  a.js\n");
    }
}
