use std::io::Write;

use localcmd::config::{DEFAULT_SHELL, load_and_validate, load_from_path};
use localcmd::errors::LocalCmdError;
use tempfile::NamedTempFile;

fn job_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn loads_full_job_file() {
    let file = job_file(
        r#"
[command]
cmd = "make ${target|all}"
working_dir = "${root}"
shell = "bash"
env = ["PATH=/usr/bin:/bin", "MODE=ci"]
script = true

[expansions]
root = "/srv/project"
target = "release"
"#,
    );

    let job = load_and_validate(file.path()).unwrap();

    assert_eq!(job.command.command, "make ${target|all}");
    assert_eq!(job.command.working_dir, "${root}");
    assert_eq!(job.command.effective_shell(), "bash");
    assert!(job.command.script);
    assert_eq!(
        job.command.env_pairs(),
        Some(vec![("PATH", "/usr/bin:/bin"), ("MODE", "ci")])
    );
    assert_eq!(job.expansions.get("root"), Some("/srv/project"));
    assert_eq!(job.expansions.get("target"), Some("release"));
}

#[test]
fn minimal_job_file_uses_defaults() {
    let file = job_file(
        r#"
[command]
cmd = "echo hi"
"#,
    );

    let job = load_and_validate(file.path()).unwrap();

    assert_eq!(job.command.working_dir, "");
    assert_eq!(job.command.shell, None);
    assert_eq!(job.command.effective_shell(), DEFAULT_SHELL);
    assert_eq!(job.command.env, None);
    assert!(!job.command.script);
    assert!(job.expansions.is_empty());
}

#[test]
fn empty_command_is_a_config_error() {
    let file = job_file(
        r#"
[command]
cmd = "   "
"#,
    );

    match load_and_validate(file.path()) {
        Err(LocalCmdError::ConfigError(msg)) => assert!(msg.contains("cmd must not be empty")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn env_entry_without_equals_is_a_config_error() {
    let file = job_file(
        r#"
[command]
cmd = "env"
env = ["JUSTAKEY"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(LocalCmdError::ConfigError(msg)) => {
            assert!(msg.contains("JUSTAKEY"));
            assert!(msg.contains("KEY=VALUE"));
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn env_entry_with_empty_key_is_a_config_error() {
    let file = job_file(
        r#"
[command]
cmd = "env"
env = ["=value"]
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(LocalCmdError::ConfigError(_))
    ));
}

#[test]
fn blank_shell_is_a_config_error() {
    let file = job_file(
        r#"
[command]
cmd = "echo hi"
shell = ""
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(LocalCmdError::ConfigError(_))
    ));
}

#[test]
fn missing_command_section_is_a_toml_error() {
    let file = job_file(
        r#"
[expansions]
a = "b"
"#,
    );

    assert!(matches!(
        load_from_path(file.path()),
        Err(LocalCmdError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        load_and_validate(&path),
        Err(LocalCmdError::IoError(_))
    ));
}
