//! Exit codes and output of the demo binary.

use assert_cmd::Command;
use tempfile::TempDir;

/// Runs the demo with an empty config directory and colours off.
fn demo(config: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("phaserun-demo").unwrap();
    cmd.env("XDG_CONFIG_HOME", config.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> (i32, String, String) {
    let output = cmd.output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_greet_succeeds() {
    let config = TempDir::new().unwrap();
    let (code, stdout, _) = stdout_of(demo(&config).args(["greet", "world"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("Hello, world!"));
}

#[test]
fn test_greet_with_local_and_global_flags() {
    let config = TempDir::new().unwrap();
    let (code, stdout, _) =
        stdout_of(demo(&config).args(["--verbose", "greet", "-g", "Hi", "--loud", "ada"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("HI, ADA!"));
}

#[test]
fn test_greet_with_too_many_arguments() {
    let config = TempDir::new().unwrap();
    let (code, _, stderr) = stdout_of(demo(&config).args(["greet", "a", "b"]));
    assert_eq!(code, 2);
    assert!(stderr.contains("too many arguments for command greet which accepts max (1) args"));
}

#[test]
fn test_unknown_command_and_flag() {
    let config = TempDir::new().unwrap();
    demo(&config).args(["wave"]).assert().code(2);
    demo(&config).args(["--shout", "greet", "x"]).assert().code(2);
    demo(&config).args(["greet", "--shout", "x"]).assert().code(2);
}

#[test]
fn test_no_command_exits_with_config_error() {
    let config = TempDir::new().unwrap();
    let (code, stdout, _) = stdout_of(&mut demo(&config));
    assert_eq!(code, 2);
    assert!(stdout.contains("greet"));
}

#[test]
fn test_help_exits_zero() {
    let config = TempDir::new().unwrap();
    let (code, stdout, _) = stdout_of(demo(&config).args(["remote", "add", "--help"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("phaserun-demo remote add [flags] <name> <url>"));
    assert!(stdout.contains("--force, -f"));
}

#[test]
fn test_help_beats_argument_errors() {
    let config = TempDir::new().unwrap();
    let (code, stdout, stderr) = stdout_of(demo(&config).args(["greet", "a", "b", "--help"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("phaserun-demo greet [flags] <name>"));
    assert!(!stderr.contains("too many arguments"));
}

#[test]
fn test_bash_completion_candidates() {
    let config = TempDir::new().unwrap();
    let (code, stdout, _) =
        stdout_of(demo(&config).args(["remote", "--show-bash-completion"]));
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["add", "list"]);
}

#[test]
fn test_fetch_fans_out_tasks() {
    let config = TempDir::new().unwrap();
    let (code, stdout, _) =
        stdout_of(demo(&config).args(["fetch", "--delay-ms", "5", "alpha", "beta", "gamma"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("fetched 14 byte(s) from 3 source(s)"));
}

#[test]
fn test_failing_task_exits_one_and_runs_cleanup() {
    let config = TempDir::new().unwrap();
    let (code, _, stderr) =
        stdout_of(demo(&config).args(["fetch", "--fail-on", "beta", "alpha", "beta"]));
    assert_eq!(code, 1);
    assert!(stderr.contains("cleaning up after fetch"));
    assert!(stderr.contains("source beta is unreachable"));
}

#[test]
fn test_group_without_subcommand_fails_at_dispatch() {
    let config = TempDir::new().unwrap();
    let (code, _, stderr) = stdout_of(demo(&config).args(["remote"]));
    assert_eq!(code, 1);
    assert!(stderr.contains("command not provided"));
}

#[test]
fn test_enum_flag_rejects_unknown_value() {
    let config = TempDir::new().unwrap();
    demo(&config).args(["check", "--level", "info"]).assert().code(2);
    demo(&config).args(["check", "--level", "warn"]).assert().code(1);
}

// `dirs` only honours XDG_CONFIG_HOME on Linux.
#[cfg(target_os = "linux")]
#[test]
fn test_display_config_hides_header() {
    let config = TempDir::new().unwrap();
    let app_dir = config.path().join("phaserun-demo");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("display.toml"), "show_header = false\nshow_footer = false\n")
        .unwrap();

    let (code, stdout, _) = stdout_of(demo(&config).args(["greet", "world"]));
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Hello, world!");
}
