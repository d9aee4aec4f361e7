//! Module path arithmetic for fingerprinted names.
//!
//! Module paths are loader paths, always `/`-separated regardless of platform.

/// Normalize a module path the way a POSIX path join does: drop `.` and empty
/// segments and resolve `..` against preceding segments where possible.
///
/// Returns `"."` for a path that normalizes to nothing.
pub fn normalize_module_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Split a module path into its normalized directory and base name.
///
/// The directory is empty for modules at the root.
pub fn split_module_path(path: &str) -> (String, String) {
    let normalized = normalize_module_path(path);
    match normalized.rfind('/') {
        Some(0) => ("/".to_string(), normalized[1..].to_string()),
        Some(idx) => (
            normalized[..idx].to_string(),
            normalized[idx + 1..].to_string(),
        ),
        None => (String::new(), normalized),
    }
}

/// File name on disk for a module base name and extension.
pub fn module_file_name(base: &str, extension: &str) -> String {
    format!("{}.{}", base, extension)
}

/// Renamed file name: digest, a dot, then the original file name.
pub fn hashed_file_name(digest: &str, file_name: &str) -> String {
    format!("{}.{}", digest, file_name)
}

/// Module path that refers to the renamed file (no extension).
pub fn hashed_module_path(dir: &str, digest: &str, base: &str) -> String {
    let name = format!("{}.{}", digest, base);
    match dir {
        "" => name,
        "/" => format!("/{}", name),
        _ => format!("{}/{}", dir, name),
    }
}
