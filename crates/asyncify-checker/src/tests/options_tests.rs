use super::*;
use std::io::Write;

#[test]
fn test_default_options() {
    let options = OracleOptions::default();
    assert!(options.is_promise_global("fetch"));
    assert!(options.is_promise_member("json"));
    assert!(options.is_promise_member("arrayBuffer"));
    assert!(options.is_promise_type_name("PromiseLike"));
    assert!(!options.is_promise_global("setTimeout"));
}

#[test]
fn test_from_json5_keeps_missing_defaults() {
    let options = OracleOptions::from_json5_str(
        "{\n  // project-specific promise factories\n  promiseGlobals: ['fetch', 'request'],\n}",
    )
    .expect("valid options");
    assert!(options.is_promise_global("request"));
    assert!(options.is_promise_member("text"));
}

#[test]
fn test_from_json5_reports_parse_error() {
    let err = OracleOptions::from_json5_str("{ promiseGlobals: [").expect_err("invalid");
    assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    assert!(err.to_string().starts_with("invalid options:"));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "{{ promiseMembers: ['load'] }}").expect("write");
    let options = OracleOptions::load(file.path()).expect("load");
    assert_eq!(options.promise_members, vec!["load".to_string()]);
    assert_eq!(options.promise_globals, vec!["fetch".to_string()]);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = OracleOptions::load(&dir.path().join("missing.json5")).expect_err("missing");
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(std::error::Error::source(&err).is_some());
}
