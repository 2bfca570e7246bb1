use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file(name: &str, content: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("script-runner-cli-{}-{}", nanos, name));
    fs::write(&path, content).expect("file should be written");
    path
}

fn run_cli(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sr-cli"))
        .arg("run")
        .args(args)
        .output()
        .expect("cli should execute")
}

#[test]
fn run_prints_result_json() {
    let script = temp_file(
        "total.js",
        "function total(items) {\nreturn items.reduce((sum, item) => sum + item.price, 0);\n}\nreturn { label: \"{{$CURRENT_ITEM.label}}\", total: total({{$CURRENT_ITEM.items}}) };\n",
    );
    let values = temp_file(
        "values.json",
        r#"{"items": [{"price": 2}, {"price": 3.5}]}"#,
    );
    let defaults = temp_file("defaults.json", r#"{"label": "order"}"#);

    let output = run_cli(&[
        OsStr::new("--script"),
        script.as_os_str(),
        OsStr::new("--values"),
        values.as_os_str(),
        OsStr::new("--defaults"),
        defaults.as_os_str(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout:\n{}", stdout);
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec!["RESULT:OK", r#"RESULT_JSON:{"label":"order","total":5.5}"#]
    );
}

#[test]
fn run_reports_script_errors() {
    let script = temp_file("plain.js", "return 1+1;");
    let output = run_cli(&[OsStr::new("--script"), script.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:STRUCTURAL_ERROR"));
    assert!(stdout.contains(
        r#"ERROR_MSG_JSON:"/run-script Error: Code string must contain a valid function definition""#
    ));
}

#[test]
fn run_reports_missing_script_file() {
    let missing = std::env::temp_dir().join("script-runner-cli-does-not-exist.js");
    let output = run_cli(&[OsStr::new("--script"), missing.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR_CODE:CLI_ERROR"));
    assert!(stdout.contains("failed to read script"));
}
