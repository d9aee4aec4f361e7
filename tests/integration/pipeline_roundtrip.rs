use std::fs;

use pathstamp::emit::Emitter;
use pathstamp::error::{FingerprintError, PipelineError};
use pathstamp::fingerprint::{FingerprintConfig, Fingerprinter};
use pathstamp::{extract, Pipeline};
use tempfile::TempDir;

use crate::integration::support::{pipeline_at, sha1_8, write_file, ROUNDTRIP_BOOTSTRAP};

#[test]
fn present_module_is_renamed_and_missing_module_dropped() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "mods/a.js", "console.log(1);");
    write_file(temp.path(), "boot.js", ROUNDTRIP_BOOTSTRAP);

    let input = temp.path().join("boot.js");
    let output = temp.path().join("out/boot.js");
    let processed = pipeline_at(temp.path(), 1).run(&input, &output).unwrap();

    let digest = sha1_8(b"console.log(1);");
    let hashed = format!("mods/{}.a", digest);
    assert_eq!(processed.paths.len(), 1);
    assert_eq!(processed.paths.get("a"), Some(hashed.as_str()));
    assert!(!processed.paths.contains("b"));

    assert!(!temp.path().join("mods/a.js").exists());
    assert!(temp
        .path()
        .join(format!("mods/{}.a.js", digest))
        .exists());
    assert_eq!(processed.skipped.len(), 1);
    assert_eq!(processed.skipped[0].module, "b");

    let written = fs::read_to_string(&output).unwrap();
    let reparsed = extract(&written).unwrap();
    assert_eq!(reparsed.config.paths(), &processed.paths);
}

#[test]
fn callback_field_is_written_as_source() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "mods/a.js", "console.log(1);");
    write_file(temp.path(), "boot.js", ROUNDTRIP_BOOTSTRAP);

    let input = temp.path().join("boot.js");
    pipeline_at(temp.path(), 1).run(&input, &input).unwrap();

    let written = fs::read_to_string(&input).unwrap();
    assert!(written.contains("onXhrComplete: function(x){ return x+1; }"));
    assert!(!written.contains("\"function(x){ return x+1; }\""));
    assert!(!written.contains("'function(x){ return x+1; }'"));
}

#[test]
fn init_call_survives_unchanged() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "mods/a.js", "console.log(1);");
    write_file(temp.path(), "boot.js", ROUNDTRIP_BOOTSTRAP);

    let input = temp.path().join("boot.js");
    let before = extract(ROUNDTRIP_BOOTSTRAP).unwrap();
    pipeline_at(temp.path(), 1).run(&input, &input).unwrap();
    let after = extract(&fs::read_to_string(&input).unwrap()).unwrap();

    assert_eq!(after.init, before.init);
    assert_eq!(
        after.init.callback.as_str(),
        "function (a, b) {\n\ta.start(b, \"done\\n\");\n}"
    );
}

#[test]
fn second_run_rehashes_renamed_files() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "mods/a.js", "console.log(1);");
    write_file(temp.path(), "boot.js", ROUNDTRIP_BOOTSTRAP);
    let input = temp.path().join("boot.js");
    let pipeline = pipeline_at(temp.path(), 1);

    pipeline.run(&input, &input).unwrap();
    let second = pipeline.run(&input, &input).unwrap();

    let digest = sha1_8(b"console.log(1);");
    assert_eq!(
        second.paths.get("a"),
        Some(format!("mods/{0}.{0}.a", digest).as_str())
    );
    assert!(second.skipped.is_empty());
}

#[test]
fn failed_rename_writes_no_output() {
    let temp = TempDir::new().unwrap();
    let source_root = temp.path().join("src");
    let output_root = temp.path().join("dist");
    write_file(&source_root, "mods/a.js", "console.log(1);");
    fs::create_dir_all(&output_root).unwrap();
    write_file(temp.path(), "boot.js", ROUNDTRIP_BOOTSTRAP);

    let pipeline = Pipeline::new(
        Fingerprinter::new(FingerprintConfig {
            source_root,
            output_root,
            ..FingerprintConfig::default()
        }),
        Emitter::default(),
    );
    let output = temp.path().join("out.js");
    let err = pipeline
        .run(&temp.path().join("boot.js"), &output)
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Fingerprint(FingerprintError::Rename { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn missing_callback_field_aborts_before_renaming() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "mods/a.js", "console.log(1);");
    write_file(
        temp.path(),
        "boot.js",
        "require.config({ paths: { a: 'mods/a' } });\nrequire(['a'], function (a) {});\n",
    );

    let output = temp.path().join("out.js");
    let err = pipeline_at(temp.path(), 1)
        .run(&temp.path().join("boot.js"), &output)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Reserialization(_)));
    assert!(temp.path().join("mods/a.js").exists());
    assert!(!output.exists());
}

#[test]
fn strict_mode_fails_on_missing_module() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "boot.js", ROUNDTRIP_BOOTSTRAP);
    let pipeline = Pipeline::new(
        Fingerprinter::new(FingerprintConfig {
            source_root: temp.path().to_path_buf(),
            output_root: temp.path().to_path_buf(),
            strict_missing: true,
            ..FingerprintConfig::default()
        }),
        Emitter::default(),
    );

    let err = pipeline
        .process(&temp.path().join("boot.js"))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Fingerprint(FingerprintError::ModuleFileMissing { .. })
    ));
}

#[test]
fn concurrent_run_keeps_declaration_order() {
    let temp = TempDir::new().unwrap();
    let mut paths = String::new();
    for i in 0..24 {
        if i % 5 != 0 {
            write_file(temp.path(), &format!("lib/m{i}.js"), &format!("module {i}"));
        }
        paths.push_str(&format!("    m{i}: 'lib/m{i}',\n"));
    }
    let source = format!(
        "require.config({{\n  paths: {{\n{paths}  }},\n  config: {{ text: {{ onXhrComplete: function () {{}} }} }}\n}});\nrequire([], function () {{}});\n"
    );
    write_file(temp.path(), "boot.js", &source);

    let processed = pipeline_at(temp.path(), 4)
        .process(&temp.path().join("boot.js"))
        .unwrap();

    let modules: Vec<&str> = processed.paths.iter().map(|e| e.module.as_str()).collect();
    let expected: Vec<String> = (0..24).filter(|i| i % 5 != 0).map(|i| format!("m{i}")).collect();
    assert_eq!(modules, expected.iter().map(String::as_str).collect::<Vec<_>>());
    for entry in processed.paths.iter() {
        let n: usize = entry.module[1..].parse().unwrap();
        let digest = sha1_8(format!("module {n}").as_bytes());
        assert_eq!(entry.path, format!("lib/{}.m{}", digest, n));
    }
    assert_eq!(processed.skipped.len(), 5);
}
