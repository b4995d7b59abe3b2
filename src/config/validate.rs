// src/config/validate.rs

use crate::config::model::{CommandConfig, JobFile, RawJobFile};
use crate::errors::{LocalCmdError, Result};
use crate::expand::Expansions;

impl TryFrom<RawJobFile> for JobFile {
    type Error = LocalCmdError;

    fn try_from(raw: RawJobFile) -> std::result::Result<Self, Self::Error> {
        validate_command(&raw.command)?;
        Ok(JobFile::new_unchecked(
            raw.command,
            Expansions::from(raw.expansions),
        ))
    }
}

/// Check the invariants of a `[command]` section.
pub fn validate_command(cfg: &CommandConfig) -> Result<()> {
    ensure_has_command(cfg)?;
    validate_shell(cfg)?;
    validate_env(cfg)?;
    Ok(())
}

fn ensure_has_command(cfg: &CommandConfig) -> Result<()> {
    if cfg.command.trim().is_empty() {
        return Err(LocalCmdError::ConfigError(
            "[command].cmd must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_shell(cfg: &CommandConfig) -> Result<()> {
    if let Some(shell) = &cfg.shell {
        if shell.trim().is_empty() {
            return Err(LocalCmdError::ConfigError(
                "[command].shell must not be empty when set (omit it to use sh)".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_env(cfg: &CommandConfig) -> Result<()> {
    let Some(entries) = &cfg.env else {
        return Ok(());
    };

    for entry in entries {
        match entry.split_once('=') {
            Some((key, _)) if !key.is_empty() => {}
            Some(_) => {
                return Err(LocalCmdError::ConfigError(format!(
                    "[command].env entry '{}' has an empty key",
                    entry
                )));
            }
            None => {
                return Err(LocalCmdError::ConfigError(format!(
                    "[command].env entry '{}' is not of the form KEY=VALUE",
                    entry
                )));
            }
        }
    }
    Ok(())
}
