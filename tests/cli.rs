use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Run the binary with an empty tool root so no stray config is picked up.
fn llmify(tool_root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_llmify"))
        .env("LLMIFY_HOME", tool_root)
        .args(args)
        .output()
        .unwrap()
}

fn scenario(root: &Path) {
    write_file(&root.join("a.txt"), "hello");
    write_file(&root.join("b/c.py"), "print(1)");
    write_file(&root.join("b/ignored.pyc"), "\u{0}\u{1}");
    write_file(&root.join("llmify_config.yaml"), "ignored_files:\n  - \"*.pyc\"\n  - llmify_config.yaml\n");
}

#[test]
fn cli_text_output_to_stdout() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    scenario(dir.path());

    let output = llmify(
        home.path(),
        &["-d", dir.path().to_str().unwrap(), "-o", "-"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("=== Directory Listing ===\n"));
    assert!(stdout.contains("├── a.txt\n"));
    assert!(stdout.contains("└── b/\n"));
    assert!(stdout.contains("    └── c.py\n"));
    assert!(stdout.contains("### FILE: a.txt\nhello\n"));
    assert!(stdout.contains("### FILE: b/c.py\nprint(1)\n"));
    assert!(!stdout.contains("ignored.pyc"));
    assert!(!stdout.contains("Token Summary"));
}

#[test]
fn cli_json_output_with_tokens() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    scenario(dir.path());

    let output = llmify(
        home.path(),
        &["-d", dir.path().to_str().unwrap(), "-o", "-", "-f", "json", "-t"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let files = v.get("files").and_then(|f| f.as_array()).unwrap();

    let paths: Vec<&str> = files
        .iter()
        .map(|f| f.get("path").unwrap().as_str().unwrap())
        .collect();
    assert_eq!(paths, ["a.txt", "b/c.py"]);

    let sum: u64 = files
        .iter()
        .map(|f| f.get("token_count").unwrap().as_u64().unwrap())
        .sum();
    let total = v.get("total_token_count").unwrap().as_u64().unwrap();
    assert!(total > 0);
    assert_eq!(total, sum);
}

#[test]
fn cli_writes_output_file() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    let out = tempdir().unwrap();
    scenario(dir.path());
    let target = out.path().join("codebase.txt");

    let output = llmify(
        home.path(),
        &[
            "-d",
            dir.path().to_str().unwrap(),
            "-o",
            target.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("### FILE: b/c.py"));
}

#[test]
fn cli_malformed_config_fails_and_names_file() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), "hello");
    let config = home.path().join("broken.yaml");
    write_file(&config, "ignored_dirs: [unterminated\n");

    let output = llmify(
        home.path(),
        &[
            "-d",
            dir.path().to_str().unwrap(),
            "-o",
            "-",
            "-c",
            config.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("broken.yaml"));
}

#[test]
fn cli_missing_directory_exit_code() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let output = llmify(
        home.path(),
        &["-d", missing.to_str().unwrap(), "-o", "-", "-q"],
    );

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: path not found"));
}

#[test]
fn cli_without_config_warns_and_includes_everything() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    write_file(&dir.path().join("x.pyc"), "compiled");

    let output = llmify(home.path(), &["-d", dir.path().to_str().unwrap(), "-o", "-"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("### FILE: x.pyc\ncompiled\n"));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No configuration file found"));
}

#[test]
fn cli_completions() {
    let home = tempdir().unwrap();
    let output = llmify(home.path(), &["--completions", "bash"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("llmify"));
}

#[test]
fn cli_default_output_inside_target_is_not_reincluded() {
    let dir = tempdir().unwrap();
    let home = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), "hello");

    let run = || {
        Command::new(env!("CARGO_BIN_EXE_llmify"))
            .env("LLMIFY_HOME", home.path())
            .current_dir(dir.path())
            .arg("-q")
            .output()
            .unwrap()
    };

    assert!(run().status.success());
    let first = fs::read_to_string(dir.path().join("codebase.txt")).unwrap();
    assert!(run().status.success());
    let second = fs::read_to_string(dir.path().join("codebase.txt")).unwrap();

    assert_eq!(first, second);
    assert!(!second.contains("### FILE: codebase.txt"));
}
