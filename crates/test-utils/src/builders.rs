use localcmd::config::CommandConfig;
use localcmd::exec::LocalCommand;

/// Builder for `CommandConfig` to simplify test setup.
pub struct CommandConfigBuilder {
    config: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            config: CommandConfig::new(cmd),
        }
    }

    pub fn working_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self {
        self.config.working_dir = dir.as_ref().to_string_lossy().into_owned();
        self
    }

    pub fn shell(mut self, shell: &str) -> Self {
        self.config.shell = Some(shell.to_string());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.config.env.get_or_insert_with(Vec::new).push(entry.to_string());
        self
    }

    /// Replace the environment with an empty one.
    pub fn empty_env(mut self) -> Self {
        self.config.env = Some(Vec::new());
        self
    }

    pub fn script(mut self, val: bool) -> Self {
        self.config.script = val;
        self
    }

    pub fn build(self) -> CommandConfig {
        self.config
    }

    /// Build straight into an executor with no output sinks.
    pub fn command(self) -> LocalCommand {
        LocalCommand::new(self.config)
    }
}
