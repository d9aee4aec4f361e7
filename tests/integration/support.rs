use pathstamp::emit::Emitter;
use pathstamp::fingerprint::hasher::{compute_digest, HashAlgorithm};
use pathstamp::fingerprint::{FingerprintConfig, Fingerprinter};
use pathstamp::Pipeline;
use std::fs;
use std::path::Path;

pub const ROUNDTRIP_BOOTSTRAP: &str = r#"// generated by the build
require.config({
  baseUrl: 'js',
  paths: {
    a: 'mods/a',
    b: 'mods/b'
  },
  config: {
    text: {
      onXhrComplete: function(x){ return x+1; }
    }
  }
});
require(['a', 'b'], function (a, b) {
	a.start(b, "done\n");
});
"#;

pub fn sha1_8(bytes: &[u8]) -> String {
    compute_digest(bytes, HashAlgorithm::Sha1, 8)
}

pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Pipeline that reads and renames module files under one root.
pub fn pipeline_at(root: &Path, concurrency: usize) -> Pipeline {
    Pipeline::new(
        Fingerprinter::new(FingerprintConfig {
            source_root: root.to_path_buf(),
            output_root: root.to_path_buf(),
            concurrency,
            ..FingerprintConfig::default()
        }),
        Emitter::default(),
    )
}
