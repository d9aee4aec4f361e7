use std::fs;
use std::path::PathBuf;

use pathstamp::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

use crate::integration::support::{sha1_8, write_file, ROUNDTRIP_BOOTSTRAP};

fn workspace_with_config() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "app/mods/a.js", "console.log(1);");
    write_file(temp.path(), "app/boot.js", ROUNDTRIP_BOOTSTRAP);
    write_file(
        temp.path(),
        "pathstamp.toml",
        "[pipeline]\ninput = \"app/boot.js\"\noutput = \"dist/boot.js\"\nsource_root = \"app\"\noutput_root = \"app\"\n",
    );
    temp
}

fn run(format: &str) -> Commands {
    Commands::Run {
        input: None,
        output: None,
        source_root: None,
        output_root: None,
        dry_run: false,
        strict: false,
        concurrency: None,
        format: format.to_string(),
    }
}

#[test]
fn run_json_contract_has_required_fields() {
    let temp = workspace_with_config();
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli.execute(&run("json")).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(parsed.get("generated_at").and_then(|v| v.as_str()).is_some());
    assert_eq!(parsed.get("dry_run").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(parsed.get("algorithm").and_then(|v| v.as_str()), Some("sha1"));
    assert_eq!(parsed.get("renamed").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(parsed.get("skipped").and_then(|v| v.as_u64()), Some(1));

    let renames = parsed
        .get("renames")
        .and_then(|v| v.as_array())
        .expect("renames array should exist");
    let digest = sha1_8(b"console.log(1);");
    assert_eq!(renames[0]["module"], "a");
    assert_eq!(renames[0]["old_path"], "mods/a");
    assert_eq!(renames[0]["new_path"], format!("mods/{}.a", digest));
    assert_eq!(renames[0]["digest"], digest);

    let skipped = parsed
        .get("skipped_modules")
        .and_then(|v| v.as_array())
        .expect("skipped_modules array should exist");
    assert_eq!(skipped[0]["module"], "b");
    assert!(skipped[0].get("reason").and_then(|v| v.as_str()).is_some());

    let written = fs::read_to_string(temp.path().join("dist/boot.js")).unwrap();
    assert!(written.contains(&format!("a: 'mods/{}.a'", digest)));
    assert_eq!(
        fs::read_to_string(temp.path().join("app/boot.js")).unwrap(),
        ROUNDTRIP_BOOTSTRAP
    );
}

#[test]
fn flags_override_workspace_config() {
    let temp = workspace_with_config();
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::Run {
            input: None,
            output: Some(PathBuf::from("other/boot.js")),
            source_root: None,
            output_root: None,
            dry_run: true,
            strict: false,
            concurrency: Some(2),
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["dry_run"], true);
    assert!(parsed["output"].as_str().unwrap().ends_with("boot.js"));
    assert!(!temp.path().join("other/boot.js").exists());
    assert!(temp.path().join("app/mods/a.js").exists());
}

#[test]
fn strict_flag_turns_missing_module_into_error() {
    let temp = workspace_with_config();
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let err = cli
        .execute(&Commands::Run {
            input: None,
            output: None,
            source_root: None,
            output_root: None,
            dry_run: false,
            strict: true,
            concurrency: None,
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("'b'"));
    assert!(!temp.path().join("dist/boot.js").exists());
}

#[test]
fn inspect_json_contract_has_required_fields() {
    let temp = workspace_with_config();
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::Inspect {
            input: None,
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["paths"]["a"], "mods/a");
    assert_eq!(parsed["paths"]["b"], "mods/b");
    assert_eq!(parsed["dependencies"], serde_json::json!(["a", "b"]));
    assert_eq!(parsed["callback_field"], "config.text.onXhrComplete");
    assert_eq!(parsed["callback_present"], true);
    assert!(parsed.get("callback_error").is_none());
}

#[test]
fn explicit_config_file_replaces_workspace_file() {
    let temp = workspace_with_config();
    let custom = temp.path().join("custom.toml");
    fs::write(&custom, "[digest]\nlength = 12\n").unwrap();
    write_file(temp.path(), "build-tmp/js/core/appsettings.js", ROUNDTRIP_BOOTSTRAP);

    let cli = CliContext::new(temp.path().to_path_buf(), Some(custom)).unwrap();
    assert_eq!(cli.config().digest.length, 12);
    assert_eq!(
        cli.config().pipeline.input,
        PathBuf::from("build-tmp/js/core/appsettings.js")
    );
}
