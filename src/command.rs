use anyhow::Context as _;
use tokio::process::Command;

use crate::executor::Operation;

#[derive(Debug, Clone)]
pub struct CommandOperation {
    shell: String,
}

impl CommandOperation {
    pub fn new(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }
}

impl Operation for CommandOperation {
    type Item = String;

    #[tracing::instrument(skip(self), fields(shell = %self.shell))]
    async fn run(&self, item: &String) -> anyhow::Result<()> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(item)
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.shell))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(stdout = %stdout.trim_end(), "command output");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{}: {}", output.status, stderr.trim());
        }

        Ok(())
    }
}
