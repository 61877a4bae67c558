//! Integration tests running real commands through `sh`.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use cloudock_shell::{Shell, ShellError, resolve_program};

#[test]
fn returns_output_lines() {
    let shell = Shell::new(std::env::temp_dir());
    let lines = shell.execute("printf", &["%s\\n%s\\n", "first", "second"]).expect("run");
    assert_eq!(lines, vec!["first", "second"]);
}

#[test]
fn runs_in_the_working_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
    let lines = Shell::new(dir.path()).execute("ls", &[]).expect("run");
    assert_eq!(lines, vec!["marker.txt"]);
}

#[test]
fn arguments_are_not_interpreted_by_the_shell() {
    let shell = Shell::new(std::env::temp_dir());
    let lines = shell.execute("echo", &["$HOME; it's"]).expect("run");
    assert_eq!(lines, vec!["$HOME; it's"]);
}

#[test]
fn failure_reports_code_and_sanitized_command() {
    let shell = Shell::new(std::env::temp_dir());
    let err = shell
        .execute("sh", &["-c", "echo boom >&2; exit 3", "--password=secret"])
        .expect_err("must fail");
    match err {
        ShellError::Failed {
            command,
            code,
            stderr,
        } => {
            assert_eq!(code, 3);
            assert_eq!(stderr, "boom");
            assert!(command.contains("--password=***"));
            assert!(!command.contains("secret"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn timeout_kills_the_process() {
    let shell = Shell::new(std::env::temp_dir()).with_timeout(Some(Duration::from_millis(200)));
    let err = shell.execute("sleep", &["5"]).expect_err("must time out");
    assert!(matches!(err, ShellError::Timeout { .. }));
}

#[test]
fn completes_within_the_timeout() {
    let shell = Shell::new(std::env::temp_dir()).with_timeout(Some(Duration::from_secs(10)));
    assert_eq!(shell.execute("echo", &["ok"]).expect("run"), vec!["ok"]);
}

#[test]
fn missing_working_directory_fails_to_spawn() {
    let shell = Shell::new("/nonexistent/cloudock/dir");
    let err = shell.execute("true", &[]).expect_err("must fail");
    assert!(matches!(err, ShellError::Spawn { .. }));
}

#[test]
fn resolves_programs_on_the_path() {
    assert!(resolve_program("sh").is_ok());
    assert!(matches!(
        resolve_program("cloudock-no-such-program"),
        Err(ShellError::NotFound { .. })
    ));
}
