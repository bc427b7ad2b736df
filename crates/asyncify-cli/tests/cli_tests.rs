use asyncify_cli::args::{CliArgs, Target};
use asyncify_cli::{EXIT_PARSE_ERRORS, EXIT_SUCCESS, run};
use clap::Parser;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LOAD: &str = "function load(): Promise<void> {\n    return fetch(u).then(res => console.log(res));\n}\n";
const LOAD_CONVERTED: &str = "async function load(): Promise<void> {\n    const res = await fetch(u);\n    return console.log(res);\n}\n";

fn run_cli(args: &[&str]) -> (i32, String) {
    let args = CliArgs::parse_from(std::iter::once("asyncify").chain(args.iter().copied()));
    let mut out = Vec::new();
    let status = run(&args, &mut out).expect("run");
    (status, String::from_utf8(out).expect("utf8"))
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

#[test]
fn test_target_selection_from_flags() {
    let parse = |args: &[&str]| {
        CliArgs::parse_from(std::iter::once("asyncify").chain(args.iter().copied())).target()
    };
    assert_eq!(parse(&["a.ts"]), Target::All);
    assert_eq!(parse(&["a.ts", "--position", "12"]), Target::Position(12));
    assert_eq!(
        parse(&["a.ts", "--line", "2", "--column", "5"]),
        Target::LineColumn { line: 2, column: 5 }
    );
    assert_eq!(
        parse(&["a.ts", "--function", "load"]),
        Target::Function("load".to_string())
    );
}

#[test]
fn test_conflicting_targets_are_rejected() {
    let parse = |args: &[&str]| {
        CliArgs::try_parse_from(std::iter::once("asyncify").chain(args.iter().copied()))
    };
    assert!(parse(&["a.ts", "--position", "1", "--all"]).is_err());
    assert!(parse(&["a.ts", "--line", "1"]).is_err());
    assert!(parse(&[]).is_err());
}

#[test]
fn test_prints_converted_file() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("load.ts");
    fs::write(&file, LOAD).expect("write");

    let (status, out) = run_cli(&[path_arg(&file), "--no-color"]);
    assert_eq!(status, EXIT_SUCCESS);
    assert_eq!(out, LOAD_CONVERTED);
    assert_eq!(fs::read_to_string(&file).expect("read"), LOAD);
}

#[test]
fn test_write_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("load.ts");
    fs::write(&file, LOAD).expect("write");

    let (status, out) = run_cli(&[path_arg(&file), "--write", "--no-color"]);
    assert_eq!(status, EXIT_SUCCESS);
    assert_eq!(out, format!("converted 1 function in {}\n", file.display()));
    assert_eq!(fs::read_to_string(&file).expect("read"), LOAD_CONVERTED);
}

#[test]
fn test_write_leaves_unparsable_file_alone() {
    let dir = TempDir::new().expect("temp dir");
    let bad = dir.path().join("bad.ts");
    let good = dir.path().join("good.ts");
    let bad_source = "function f( {\n    return fetch(u).then(r => r);\n";
    fs::write(&bad, bad_source).expect("write");
    fs::write(&good, LOAD).expect("write");

    let (status, out) = run_cli(&[path_arg(dir.path()), "--write", "--no-color"]);
    assert_eq!(status, EXIT_PARSE_ERRORS);
    assert!(out.contains(" - error TS"));
    assert_eq!(fs::read_to_string(&bad).expect("read"), bad_source);
    assert_eq!(fs::read_to_string(&good).expect("read"), LOAD_CONVERTED);
}

#[test]
fn test_list_reports_suggestions() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("load.ts");
    fs::write(&file, LOAD).expect("write");

    let (status, out) = run_cli(&[path_arg(&file), "--list", "--write", "--no-color"]);
    assert_eq!(status, EXIT_SUCCESS);
    assert!(out.starts_with(&format!(
        "{}:1:10 - suggestion TS80006: This may be converted to an async function.",
        file.display()
    )));
    assert_eq!(fs::read_to_string(&file).expect("read"), LOAD);
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("load.ts");
    fs::write(&file, LOAD).expect("write");

    let (_, out) = run_cli(&[path_arg(&file), "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(json[0]["convertedFunctions"], 1);
    assert_eq!(json[0]["suggestions"][0]["code"], 80006);
    assert_eq!(json[0]["suggestions"][0]["category"], "suggestion");
    assert_eq!(json[0]["edits"][0]["newText"], "async ");
    assert!(json[0].get("source").is_none());
}

#[test]
fn test_config_file_adds_promise_producers() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("req.ts");
    fs::write(&file, "function f() {\n    return request(u).then(r => r.body);\n}\n").expect("write");
    let config = dir.path().join("asyncify.json5");
    fs::write(&config, "{\n  // custom client\n  promiseGlobals: ['request'],\n}\n").expect("write");

    let (_, without) = run_cli(&[path_arg(&file), "--no-color"]);
    assert_eq!(without, "");

    let (_, with) = run_cli(&[path_arg(&file), "--config", path_arg(&config), "--no-color"]);
    assert_eq!(
        with,
        "async function f() {\n    const r = await request(u);\n    return r.body;\n}\n"
    );
}

#[test]
fn test_missing_config_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("a.ts");
    fs::write(&file, LOAD).expect("write");
    let args = CliArgs::parse_from([
        "asyncify",
        path_arg(&file),
        "--config",
        path_arg(&dir.path().join("nope.json5")),
    ]);
    let err = run(&args, &mut Vec::new()).expect_err("missing config");
    assert!(err.to_string().contains("failed to load config"));
}

#[test]
fn test_several_files_get_headers() {
    let dir = TempDir::new().expect("temp dir");
    let a = dir.path().join("a.ts");
    let b = dir.path().join("b.ts");
    fs::write(&a, LOAD).expect("write");
    fs::write(&b, "const x = 1;\n").expect("write");

    let (_, out) = run_cli(&[path_arg(&a), path_arg(&b), "--no-color"]);
    assert_eq!(out, format!("==> {} <==\n{LOAD_CONVERTED}", a.display()));
}

#[test]
fn test_indent_option() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("a.ts");
    fs::write(&file, "function f() {\n  return fetch(u).then(r => {\n    log(r);\n    return r.ok;\n  }).catch(() => false);\n}\n").expect("write");

    let (_, out) = run_cli(&[path_arg(&file), "--indent", "2", "--no-color"]);
    assert_eq!(
        out,
        "async function f() {\n  try {\n    const r = await fetch(u);\n    log(r);\n    return r.ok;\n  } catch (e) {\n    return false;\n  }\n}\n"
    );
}
