#![cfg(unix)]

mod common;
use crate::common::{TestResult, init_tracing, with_timeout};

use std::io::Write;

use clap::Parser;
use localcmd::cli::CliArgs;
use localcmd::errors::LocalCmdError;
use tempfile::NamedTempFile;

fn job_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

fn args(file: &NamedTempFile, extra: &[&str]) -> CliArgs {
    let path = file.path().to_string_lossy().into_owned();
    let mut argv = vec!["localcmd".to_string(), "--config".to_string(), path];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn dry_run_expands_without_running() -> TestResult {
    init_tracing();

    let marker = tempfile::tempdir()?;
    let target = marker.path().join("created");
    let file = job_file(&format!(
        r#"
[command]
cmd = "touch {}/${{name}}"
"#,
        marker.path().display()
    ));

    with_timeout(localcmd::run(args(&file, &["--set", "name=created", "--dry-run"]))).await?;

    assert!(!target.exists(), "dry run executed the command");
    Ok(())
}

#[tokio::test]
async fn runs_job_with_overrides() -> TestResult {
    init_tracing();

    let marker = tempfile::tempdir()?;
    let file = job_file(&format!(
        r#"
[command]
cmd = "touch ${{name}}"
working_dir = "${{dir}}"

[expansions]
name = "from-file"
dir = "{}"
"#,
        marker.path().display()
    ));

    with_timeout(localcmd::run(args(&file, &["--set", "name=from-cli"]))).await?;

    assert!(marker.path().join("from-cli").exists());
    assert!(!marker.path().join("from-file").exists());
    Ok(())
}

#[tokio::test]
async fn failing_job_reports_exit_code() {
    init_tracing();

    let file = job_file(
        r#"
[command]
cmd = "exit 4"
"#,
    );

    let err = with_timeout(localcmd::run(args(&file, &[])))
        .await
        .unwrap_err();
    let exit = err
        .downcast_ref::<LocalCmdError>()
        .and_then(LocalCmdError::exit_code);
    assert_eq!(exit, Some(4));
}

#[tokio::test]
async fn timeout_cancels_the_job() {
    init_tracing();

    let file = job_file(
        r#"
[command]
cmd = "exec sleep 30"
"#,
    );

    let err = with_timeout(localcmd::run(args(&file, &["--timeout", "50ms"])))
        .await
        .unwrap_err();
    let canceled = err
        .downcast_ref::<LocalCmdError>()
        .is_some_and(LocalCmdError::is_canceled);
    assert!(canceled, "expected cancellation, got {err:?}");
}

#[tokio::test]
async fn unresolved_expansion_stops_before_start() {
    init_tracing();

    let file = job_file(
        r#"
[command]
cmd = "echo ${undefined}"
"#,
    );

    let err = with_timeout(localcmd::run(args(&file, &[])))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LocalCmdError>(),
        Some(LocalCmdError::Expansion(_))
    ));
}
