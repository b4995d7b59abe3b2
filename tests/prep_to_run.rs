#![cfg(unix)]

mod common;
use crate::common::{CommandConfigBuilder, SharedBuffer, TestResult, init_tracing, with_timeout};

use localcmd::errors::LocalCmdError;
use localcmd::expand::{ExpansionError, Expansions};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn expands_command_and_working_dir_before_run() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let expected = std::fs::canonicalize(dir.path())?;
    let expansions = Expansions::new()
        .with("word", "expanded")
        .with("root", dir.path().to_string_lossy());

    let out = SharedBuffer::new();
    let cmd = CommandConfigBuilder::new("echo ${word}; pwd -P")
        .working_dir("${root}")
        .command()
        .with_stdout(out.clone());

    cmd.prep_to_run(&expansions)?;
    assert_eq!(cmd.command(), "echo expanded; pwd -P");
    assert_eq!(cmd.working_dir(), dir.path().to_string_lossy());

    with_timeout(cmd.run(&CancellationToken::new())).await?;

    assert_eq!(
        out.contents_string(),
        format!("expanded\n{}\n", expected.to_string_lossy())
    );
    Ok(())
}

#[test]
fn working_dir_failure_keeps_expanded_command() {
    let cmd = CommandConfigBuilder::new("echo ${name}")
        .working_dir("bad-dir")
        .command();

    let expander = |text: &str| -> Result<String, ExpansionError> {
        if text.contains("bad") {
            Err(ExpansionError::Unresolved {
                name: "dir".to_string(),
            })
        } else {
            Ok(text.replace("${name}", "world"))
        }
    };

    let err = cmd.prep_to_run(&expander).unwrap_err();
    assert!(
        matches!(
            err,
            LocalCmdError::Expansion(ExpansionError::Unresolved { ref name }) if name == "dir"
        ),
        "got {err:?}"
    );

    assert_eq!(cmd.command(), "echo world");
    assert_eq!(cmd.working_dir(), "bad-dir");
}

#[test]
fn command_failure_leaves_working_dir_untouched() {
    let cmd = CommandConfigBuilder::new("echo ${missing}")
        .working_dir("${root}")
        .command();
    let expansions = Expansions::new().with("root", "/tmp");

    let err = cmd.prep_to_run(&expansions).unwrap_err();
    assert!(matches!(err, LocalCmdError::Expansion(_)), "got {err:?}");
    assert_eq!(cmd.command(), "echo ${missing}");
    assert_eq!(cmd.working_dir(), "${root}");
}

#[test]
fn empty_working_dir_stays_empty() -> TestResult {
    let cmd = CommandConfigBuilder::new("echo ${x|fallback}").command();
    cmd.prep_to_run(&Expansions::new())?;

    assert_eq!(cmd.command(), "echo fallback");
    assert_eq!(cmd.working_dir(), "");
    Ok(())
}

#[tokio::test]
async fn prep_after_start_is_rejected() -> TestResult {
    init_tracing();

    let cmd = CommandConfigBuilder::new("exec sleep 30").command();
    cmd.start().await?;

    let err = cmd.prep_to_run(&Expansions::new()).unwrap_err();
    assert!(
        matches!(err, LocalCmdError::AlreadyStarted { .. }),
        "got {err:?}"
    );

    cmd.stop().await?;
    Ok(())
}
