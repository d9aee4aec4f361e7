use pathstamp::bootstrap::ConfigValue;
use pathstamp::error::ExtractionError;
use pathstamp::extract;

#[test]
fn surrounding_script_is_ignored() {
    let source = r#"
var settings = window.settings || {};
/* require.config({ paths: { fake: 'no' } }); */
var note = "require(['nope'], function () {})";
if (settings.debug) { console.log('booting'); }
requirejs.config({
  paths: { app: 'core/app' },
  config: { text: { onXhrComplete: function (xhr) { return xhr; } } }
});
window.require.onError = function (err) { throw err; };
require(['app'], function (app) {
  require(['late'], function () {});
  app.start();
});
"#;
    let bootstrap = extract(source).unwrap();
    assert_eq!(bootstrap.config.paths().len(), 1);
    assert_eq!(bootstrap.config.paths().get("app"), Some("core/app"));
    assert_eq!(bootstrap.init.dependencies, vec!["app"]);
    assert!(bootstrap.init.callback.as_str().contains("require(['late']"));
}

#[test]
fn data_values_keep_their_kinds() {
    let source = "require.config({\n  waitSeconds: 0, enforceDefine: false, urlArgs: null,\n  shim: { legacy: { deps: ['a'], exports: 'Legacy' } },\n  paths: {}, config: { text: { onXhrComplete: (xhr) => xhr } }\n});\nrequire([], function () {});";
    let bootstrap = extract(source).unwrap();
    let object = bootstrap.config.to_object();
    assert_eq!(object.get("waitSeconds"), Some(&ConfigValue::Number("0".to_string())));
    assert_eq!(object.get("enforceDefine"), Some(&ConfigValue::Bool(false)));
    assert_eq!(object.get("urlArgs"), Some(&ConfigValue::Null));
    assert!(bootstrap.config.paths().is_empty());
    let exports: Vec<String> = vec!["shim".into(), "legacy".into(), "exports".into()];
    assert_eq!(
        bootstrap.config.get_path(&exports),
        Some(&ConfigValue::String("Legacy".to_string()))
    );
}

#[test]
fn computed_values_are_rejected() {
    let err = extract("require.config({ baseUrl: root + '/js' });\nrequire([], function () {});")
        .unwrap_err();
    assert!(matches!(err, ExtractionError::UnsupportedValue { line: 1, .. }));
}

#[test]
fn unterminated_config_is_a_syntax_error() {
    let err = extract("require.config({ paths: { a: 'mods/a' }\n").unwrap_err();
    assert!(matches!(err, ExtractionError::Syntax { .. }));
}

#[test]
fn init_call_needs_dependencies_and_callback() {
    let err = extract("require.config({});\nrequire(['a']);").unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::InvalidArguments {
            call: "require",
            ..
        }
    ));
}

#[test]
fn callback_with_postfix_division_is_kept_verbatim() {
    let source = "require.config({ config: { text: { onXhrComplete: function(x){ var i = 0; return i++ / 2; } } } });\nrequire([], function () { if (x) /'/.test(x); });";
    let bootstrap = extract(source).unwrap();
    let field: Vec<String> = vec!["config".into(), "text".into(), "onXhrComplete".into()];
    assert_eq!(
        bootstrap.config.get_path(&field),
        Some(&ConfigValue::Function(pathstamp::bootstrap::RawSource::new(
            "function(x){ var i = 0; return i++ / 2; }"
        )))
    );
    assert_eq!(
        bootstrap.init.callback.as_str(),
        "function () { if (x) /'/.test(x); }"
    );
}

#[test]
fn bootstrap_wrapped_in_invoked_function() {
    let source = r#"(function () {
  'use strict';
  var dev = false;
  require.config({
    paths: { app: 'core/app' },
    config: { text: { onXhrComplete: function (xhr) { return xhr; } } }
  });
  if (!dev) {
    require(['app'], function (app) { app.start(); });
  }
}());
"#;
    let bootstrap = extract(source).unwrap();
    assert_eq!(bootstrap.config.paths().get("app"), Some("core/app"));
    assert_eq!(bootstrap.init.dependencies, vec!["app"]);
}
