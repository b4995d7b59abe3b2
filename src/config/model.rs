// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::expand::Expansions;

/// Interpreter used when [`CommandConfig::shell`] is unset.
pub const DEFAULT_SHELL: &str = "sh";

/// Everything needed to launch one local command.
///
/// Maps onto the `[command]` section of a job file:
///
/// ```toml
/// [command]
/// cmd = "make ${target|all}"
/// working_dir = "${root}"
/// shell = "bash"
/// env = ["PATH=/usr/bin:/bin"]
/// script = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandConfig {
    /// Command line (or script body in script mode).
    #[serde(rename = "cmd")]
    pub command: String,

    /// Directory the process runs in. Empty means inherit the caller's.
    #[serde(default)]
    pub working_dir: String,

    /// Interpreter binary. `None` (or empty) means [`DEFAULT_SHELL`].
    #[serde(default)]
    pub shell: Option<String>,

    /// Complete `KEY=VALUE` environment for the process.
    ///
    /// `None` inherits the caller's environment; `Some` replaces it.
    #[serde(default)]
    pub env: Option<Vec<String>>,

    /// Feed `command` to the shell on stdin instead of passing it via `-c`.
    #[serde(default)]
    pub script: bool,
}

impl CommandConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// The interpreter that will actually be launched.
    pub fn effective_shell(&self) -> &str {
        match self.shell.as_deref() {
            Some(shell) if !shell.is_empty() => shell,
            _ => DEFAULT_SHELL,
        }
    }

    /// Split the configured environment into key/value pairs.
    ///
    /// Entries without `=` or with an empty key are skipped; validation
    /// rejects them for job files.
    pub fn env_pairs(&self) -> Option<Vec<(&str, &str)>> {
        self.env.as_ref().map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.split_once('='))
                .filter(|(key, _)| !key.is_empty())
                .collect()
        })
    }
}

/// Raw job file as read from TOML, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawJobFile {
    pub command: CommandConfig,

    #[serde(default)]
    pub expansions: BTreeMap<String, String>,
}

/// Validated job file.
///
/// Construct through `JobFile::try_from(raw)` so the `[command]` section has
/// been checked.
#[derive(Debug, Clone)]
pub struct JobFile {
    pub command: CommandConfig,
    pub expansions: Expansions,
}

impl JobFile {
    pub(crate) fn new_unchecked(command: CommandConfig, expansions: Expansions) -> Self {
        Self {
            command,
            expansions,
        }
    }
}
