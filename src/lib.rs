// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod expand;
pub mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::JobFile;
use crate::config::loader::load_and_validate;
use crate::exec::LocalCommand;
use crate::expand::Expansions;

pub use crate::config::CommandConfig;
pub use crate::errors::{LocalCmdError, Result as LocalCmdResult};
pub use crate::exec::CommandState;
pub use crate::expand::{Expander, ExpansionError};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading
/// - expansion (file values overridden by `--set`)
/// - the local command executor
/// - Ctrl-C and `--timeout` cancellation
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let job = load_and_validate(&config_path)
        .with_context(|| format!("loading job file {}", config_path.display()))?;

    let expansions = effective_expansions(&job, &args);
    let command = LocalCommand::new(job.command.clone())
        .with_stdout(tokio::io::stdout())
        .with_stderr(tokio::io::stderr());
    command.prep_to_run(&expansions)?;

    if args.dry_run {
        print_dry_run(&command, &expansions);
        return Ok(());
    }

    let cancel = CancellationToken::new();

    // Ctrl-C → cancel the run.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; canceling command");
            cancel.cancel();
        });
    }

    if let Some(limit) = args.timeout {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            info!(timeout = ?limit, "timeout elapsed; canceling command");
            cancel.cancel();
        });
    }

    command.run(&cancel).await?;
    debug!(pid = ?command.pid(), "command finished successfully");
    Ok(())
}

/// Job-file expansions with `--set` overrides applied on top.
fn effective_expansions(job: &JobFile, args: &CliArgs) -> Expansions {
    let mut expansions = job.expansions.clone();
    let overrides: Expansions = args.set.iter().cloned().collect();
    expansions.update(&overrides);
    expansions
}

/// Simple dry-run output: print the expanded command.
fn print_dry_run(command: &LocalCommand, expansions: &Expansions) {
    let config = command.config();

    println!("localcmd dry-run");
    println!("  expansions defined = {}", expansions.len());
    println!("  shell: {}", config.effective_shell());
    println!("  script: {}", config.script);
    if !config.working_dir.is_empty() {
        println!("  working_dir: {}", config.working_dir);
    }
    match &config.env {
        Some(env) => println!("  env: {:?}", env),
        None => println!("  env: (inherited)"),
    }
    println!("  cmd: {}", config.command);

    debug!("dry-run complete (no execution)");
}
