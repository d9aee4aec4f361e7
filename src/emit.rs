//! Bootstrap Reserialization
//!
//! Writes the updated configuration and the initialization call back out as
//! script text. Function values are raw source and are written verbatim; only
//! data values go through literal escaping.

use crate::bootstrap::{BootstrapConfig, ConfigObject, ConfigValue, InitCall, RawSource};
use crate::error::EmitError;
use std::fmt::Write;

/// Default location of the callback that must be emitted as source.
pub const DEFAULT_CALLBACK_FIELD: &str = "config.text.onXhrComplete";

const INDENT: &str = "  ";

/// Writes bootstrap text, checking the distinguished callback field first.
#[derive(Debug, Clone)]
pub struct Emitter {
    callback_field: Vec<String>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(DEFAULT_CALLBACK_FIELD)
    }
}

impl Emitter {
    /// `callback_field` is a dot-separated key path into the configuration.
    pub fn new(callback_field: &str) -> Self {
        Self {
            callback_field: callback_field.split('.').map(str::to_string).collect(),
        }
    }

    pub fn callback_field(&self) -> String {
        self.callback_field.join(".")
    }

    /// Resolve the callback field to function source.
    ///
    /// A string holding function source (a callback stringified before it
    /// reached the bootstrap) is accepted and promoted to raw source.
    pub fn resolve_callback(&self, config: &BootstrapConfig) -> Result<RawSource, EmitError> {
        match config.get_path(&self.callback_field) {
            Some(ConfigValue::Function(source)) => Ok(source.clone()),
            Some(ConfigValue::String(text)) if looks_like_function(text) => {
                Ok(RawSource::new(text.clone()))
            }
            Some(other) => Err(EmitError::CallbackNotFunction {
                field: self.callback_field(),
                found: other.kind_name().to_string(),
            }),
            None => Err(EmitError::CallbackFieldMissing(self.callback_field())),
        }
    }

    /// Produce the bootstrap text: the config declaration, a newline, then the
    /// initialization call.
    pub fn emit(&self, config: &BootstrapConfig, init: &InitCall) -> Result<String, EmitError> {
        let callback = self.resolve_callback(config)?;
        let mut object = config.to_object();
        if let Some(slot) = object.get_path_mut(&self.callback_field) {
            *slot = ConfigValue::Function(callback);
        }

        let mut out = String::new();
        out.push_str("require.config(");
        write_object(&mut out, &object, 0);
        out.push_str(");\n");
        out.push_str("require(");
        write_string_array(&mut out, &init.dependencies);
        out.push_str(", ");
        out.push_str(init.callback.as_str());
        if let Some(errback) = &init.errback {
            out.push_str(", ");
            out.push_str(errback.as_str());
        }
        out.push(')');
        Ok(out)
    }
}

fn looks_like_function(text: &str) -> bool {
    let text = text.trim_start();
    let text = strip_keyword(text, "async").map(str::trim_start).unwrap_or(text);
    if let Some(rest) = strip_keyword(text, "function") {
        return rest.starts_with(|c: char| c.is_whitespace() || c == '(' || c == '*');
    }
    match text.find("=>") {
        Some(idx) => {
            let params = text[..idx].trim();
            (params.starts_with('(') && params.ends_with(')'))
                || (!params.is_empty() && params.chars().all(is_ident_char))
        }
        None => false,
    }
}

/// `text` after a leading `keyword` that is not part of a longer identifier.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    text.strip_prefix(keyword)
        .filter(|rest| !rest.starts_with(is_ident_char))
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn write_value(out: &mut String, value: &ConfigValue, level: usize) {
    match value {
        ConfigValue::Object(object) => write_object(out, object, level),
        ConfigValue::Array(items) => write_array(out, items, level),
        ConfigValue::String(text) => write_string(out, text),
        ConfigValue::Number(raw) => out.push_str(raw),
        ConfigValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ConfigValue::Null => out.push_str("null"),
        ConfigValue::Undefined => out.push_str("undefined"),
        ConfigValue::Function(source) => out.push_str(source.as_str()),
    }
}

fn write_object(out: &mut String, object: &ConfigObject, level: usize) {
    if object.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    let count = object.len();
    for (idx, (key, value)) in object.iter().enumerate() {
        push_indent(out, level + 1);
        write_key(out, key);
        out.push_str(": ");
        write_value(out, value, level + 1);
        if idx + 1 < count {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, level);
    out.push('}');
}

fn write_array(out: &mut String, items: &[ConfigValue], level: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    let nested = items.iter().any(|item| {
        matches!(
            item,
            ConfigValue::Object(_) | ConfigValue::Array(_) | ConfigValue::Function(_)
        )
    });
    if !nested {
        out.push_str("[ ");
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            write_value(out, item, level);
        }
        out.push_str(" ]");
        return;
    }
    out.push_str("[\n");
    for (idx, item) in items.iter().enumerate() {
        push_indent(out, level + 1);
        write_value(out, item, level + 1);
        if idx + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, level);
    out.push(']');
}

fn write_string_array(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push_str("[ ");
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_string(out, item);
    }
    out.push_str(" ]");
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn write_key(out: &mut String, key: &str) {
    if is_plain_key(key) {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

/// Keys that can be written without quotes.
fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(is_ident_char)
        }
        _ => false,
    }
}

/// Write a single-quoted string literal.
pub fn write_string(out: &mut String, text: &str) {
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::extract;
    use crate::paths::{PathEntry, PathTable};
    use crate::bootstrap::scanner::Scanner;
    use crate::bootstrap::token::TokenKind;
    use proptest::prelude::*;

    const SOURCE: &str = "require.config({\n  baseUrl: 'js',\n  paths: { a: 'mods/a', b: 'mods/b' },\n  config: { text: { onXhrComplete: function(x){ return x+1; } } },\n  'data-main': [1, { deep: true }]\n});\nrequire(['a', 'b'], function (a, b) {\n\ta.go(\"\\n\");\n});\n";

    #[test]
    fn test_callback_written_unquoted() {
        let bootstrap = extract(SOURCE).unwrap();
        let text = Emitter::default()
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap();
        assert!(text.contains("onXhrComplete: function(x){ return x+1; }"));
        assert!(!text.contains("'function(x){ return x+1; }'"));
    }

    #[test]
    fn test_full_layout() {
        let bootstrap = extract(SOURCE).unwrap();
        let config = bootstrap.config.with_paths(PathTable::from_entries(vec![
            PathEntry::new("a", "mods/0123abcd.a"),
        ]));
        let text = Emitter::default().emit(&config, &bootstrap.init).unwrap();
        let expected = "require.config({\n  baseUrl: 'js',\n  paths: {\n    a: 'mods/0123abcd.a'\n  },\n  config: {\n    text: {\n      onXhrComplete: function(x){ return x+1; }\n    }\n  },\n  'data-main': [\n    1,\n    {\n      deep: true\n    }\n  ]\n});\nrequire([ 'a', 'b' ], function (a, b) {\n\ta.go(\"\\n\");\n})";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_emitted_text_extracts_back() {
        let bootstrap = extract(SOURCE).unwrap();
        let text = Emitter::default()
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap();
        let again = extract(&text).unwrap();
        assert_eq!(again.init, bootstrap.init);
        assert_eq!(again.config.paths(), bootstrap.config.paths());
        assert_eq!(again.config.to_object(), bootstrap.config.to_object());
    }

    #[test]
    fn test_error_callback_written_after_callback() {
        let bootstrap = extract(
            "require.config({ config: { text: { onXhrComplete: function () {} } } });\n\
             require(['a'], function (a) { a(); }, function (err) { throw err; });",
        )
        .unwrap();
        let text = Emitter::default()
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap();
        assert!(text.ends_with(
            "require([ 'a' ], function (a) { a(); }, function (err) { throw err; })"
        ));
        assert_eq!(extract(&text).unwrap().init, bootstrap.init);
    }

    #[test]
    fn test_missing_callback_field() {
        let bootstrap =
            extract("require.config({ paths: {} });\nrequire([], function() {});").unwrap();
        let err = Emitter::default()
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::CallbackFieldMissing("config.text.onXhrComplete".to_string())
        );
    }

    #[test]
    fn test_callback_field_wrong_kind() {
        let bootstrap = extract(
            "require.config({ config: { text: { onXhrComplete: 42 } } });\nrequire([], function() {});",
        )
        .unwrap();
        let err = Emitter::default()
            .resolve_callback(&bootstrap.config)
            .unwrap_err();
        assert!(matches!(err, EmitError::CallbackNotFunction { .. }));
    }

    #[test]
    fn test_stringified_callback_is_promoted() {
        let bootstrap = extract(
            "require.config({ config: { text: { onXhrComplete: 'function(x) {\\n\\treturn x;\\n}' } } });\n\
             require([], function() {});",
        )
        .unwrap();
        let text = Emitter::default()
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap();
        assert!(text.contains("onXhrComplete: function(x) {\n\treturn x;\n}"));
    }

    #[test]
    fn test_custom_callback_field() {
        let bootstrap =
            extract("require.config({ onLoad: x => x });\nrequire([], function() {});").unwrap();
        let text = Emitter::new("onLoad")
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap();
        assert!(text.starts_with("require.config({\n  onLoad: x => x,\n  paths: {}\n});"));
    }

    #[test]
    fn test_looks_like_function() {
        assert!(looks_like_function("function () {}"));
        assert!(looks_like_function("  async function f() {}"));
        assert!(looks_like_function("(a, b) => a"));
        assert!(looks_like_function("x => x"));
        assert!(!looks_like_function("mods/a"));
        assert!(!looks_like_function("a + b => c"));
        assert!(!looks_like_function("functions/handler"));
        assert!(!looks_like_function("function"));
        assert!(!looks_like_function("functional"));
        assert!(looks_like_function("function*gen() {}"));
        assert!(looks_like_function("asyncHandler => 1"));
    }

    #[test]
    fn test_function_prefixed_path_is_not_promoted() {
        let bootstrap = extract(
            "require.config({ config: { text: { onXhrComplete: 'functions/handler' } } });\n\
             require([], function() {});",
        )
        .unwrap();
        let err = Emitter::default()
            .emit(&bootstrap.config, &bootstrap.init)
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::CallbackNotFunction {
                field: "config.text.onXhrComplete".to_string(),
                found: "a string".to_string(),
            }
        );
    }

    proptest! {
        #[test]
        fn string_literal_scans_back_to_same_text(text in "\\PC*|[\\x00-\\x1f'\\\\\"]*") {
            let mut out = String::new();
            write_string(&mut out, &text);
            let tokens = Scanner::new(&out).tokenize().unwrap();
            prop_assert_eq!(&tokens[0].kind, &TokenKind::String(text.clone()));
        }
    }
}
