//! End-to-end tests driving the `scaffold` binary with the demo plugin.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SCAFFOLD: &str = env!("CARGO_BIN_EXE_scaffold");
const DEMO_PLUGIN: &str = env!("CARGO_BIN_EXE_scaffold-demo-plugin");

fn scaffold(cwd: &Path, args: &[&str]) -> Output {
    Command::new(SCAFFOLD)
        .current_dir(cwd)
        .args(args)
        .env_remove("SCAFFOLD_PLUGIN")
        .env_remove("SCAFFOLD_DIR")
        .env_remove("SCAFFOLD_TIMEOUT")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn init_writes_project_file() {
    let tmp = tempfile::tempdir().unwrap();

    let out = scaffold(
        tmp.path(),
        &[
            "--plugin",
            DEMO_PLUGIN,
            "--dir",
            "testproject",
            "init",
            "--domain",
            "example.com",
        ],
    );

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        fs::read_to_string(tmp.path().join("testproject/PROJECT")).unwrap(),
        "domain: example.com\n"
    );
    let printed = stdout(&out);
    assert!(printed.contains("Universe:"));
    assert!(printed.contains(r#""PROJECT": "domain: example.com\n""#));
}

#[test]
fn create_api_adds_to_existing_project() {
    let tmp = tempfile::tempdir().unwrap();
    let init = scaffold(
        tmp.path(),
        &[
            "--plugin",
            DEMO_PLUGIN,
            "--dir",
            "proj",
            "init",
            "--domain",
            "example.com",
            "--repo",
            "example.com/guestbook",
        ],
    );
    assert!(init.status.success(), "stderr: {}", stderr(&init));

    let out = scaffold(
        tmp.path(),
        &[
            "--plugin", DEMO_PLUGIN, "--dir", "proj", "create", "api", "--group", "batch",
            "--version", "v1", "--kind", "CronJob",
        ],
    );

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        fs::read_to_string(tmp.path().join("proj/api/v1/cronjob_types.yaml")).unwrap(),
        "group: batch\nversion: v1\nkind: CronJob\n"
    );
    // Plugin stderr is forwarded verbatim.
    assert!(stderr(&out).contains("scaffold-demo-plugin: wrote api/v1/cronjob_types.yaml"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("proj/PROJECT")).unwrap(),
        "domain: example.com\nrepo: example.com/guestbook\n"
    );
}

#[test]
fn plugin_path_from_env() {
    let tmp = tempfile::tempdir().unwrap();

    let out = Command::new(SCAFFOLD)
        .current_dir(tmp.path())
        .env("SCAFFOLD_PLUGIN", DEMO_PLUGIN)
        .env("SCAFFOLD_DIR", "envproject")
        .args(["init", "--domain", "env.example.com"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        fs::read_to_string(tmp.path().join("envproject/PROJECT")).unwrap(),
        "domain: env.example.com\n"
    );
}

#[test]
fn init_refuses_existing_directory() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir(tmp.path().join("proj")).unwrap();

    let out = scaffold(
        tmp.path(),
        &["--plugin", DEMO_PLUGIN, "--dir", "proj", "init", "--domain", "example.com"],
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("must not exist"));
    assert!(!tmp.path().join("proj/PROJECT").exists());
}

#[test]
fn create_requires_existing_directory() {
    let tmp = tempfile::tempdir().unwrap();

    let out = scaffold(
        tmp.path(),
        &["--plugin", DEMO_PLUGIN, "--dir", "proj", "create", "api", "--group", "g"],
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("does not exist"));
}

#[test]
fn plugin_reported_error_fails_without_writing() {
    let tmp = tempfile::tempdir().unwrap();

    let out = scaffold(tmp.path(), &["--plugin", DEMO_PLUGIN, "--dir", "proj", "init"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("init requires --domain"));
    assert!(!tmp.path().join("proj/PROJECT").exists());
}

#[test]
fn missing_plugin_executable_fails() {
    let tmp = tempfile::tempdir().unwrap();

    let out = scaffold(
        tmp.path(),
        &["--plugin", "does-not-exist", "--dir", "proj", "init", "--domain", "example.com"],
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("failed to spawn plugin"));
}

#[test]
fn usage_errors_exit_two() {
    let tmp = tempfile::tempdir().unwrap();

    let unknown = scaffold(tmp.path(), &["--plugin", DEMO_PLUGIN, "edit"]);
    assert_eq!(unknown.status.code(), Some(2));
    assert!(stderr(&unknown).contains("unknown command"));

    let no_plugin = scaffold(tmp.path(), &["init"]);
    assert_eq!(no_plugin.status.code(), Some(2));
    assert!(stderr(&no_plugin).contains("Usage: scaffold"));
}

#[test]
fn version_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let out = scaffold(tmp.path(), &["--version"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("scaffold "));
}
