use crate::cmd::Cmd;
use crate::error::{self, Result};
use crate::wait::{poll, Expectation, PollOutcome};
use log::trace;
use snafu::{ensure, ResultExt};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::Duration;

/// Executes [`Cmd`]s. Holds the path to the `kubectl` program (which defaults
/// to `kubectl`, i.e. the binary is expected to be found via `$PATH`) and an
/// optional kubeconfig path injected as `--kubeconfig` on every invocation.
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new()
    }
}

impl Kubectl {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("kubectl"),
            kubeconfig: None,
        }
    }

    /// Use `program` instead of `kubectl`. Tests use this to point the
    /// executor at a stand-in script.
    pub fn with_program<P>(mut self, program: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.program = program.into();
        self
    }

    /// Pass `--kubeconfig <path>` on every invocation.
    pub fn with_kubeconfig<P>(mut self, kubeconfig: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.kubeconfig = Some(kubeconfig.into());
        self
    }

    /// Run `cmd` and capture its stdout, trimmed of surrounding whitespace.
    /// A non-zero exit status is an error carrying the rendered command line,
    /// the exit status, and both output streams.
    pub fn output(&self, cmd: &Cmd) -> Result<String> {
        let rendered = self.render(cmd);
        trace!("capturing '{}'", rendered);
        let output = self
            .command(cmd)
            .output()
            .context(error::CommandSpawnSnafu { command: &rendered })?;
        self.check(&rendered, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run `cmd` with stdout and stderr streamed to the console.
    pub fn run(&self, cmd: &Cmd) -> Result<()> {
        let rendered = self.render(cmd);
        trace!("running '{}'", rendered);
        let status = self
            .command(cmd)
            .status()
            .context(error::CommandSpawnSnafu { command: &rendered })?;
        ensure!(
            status.success(),
            error::CommandFailedSnafu {
                command: rendered,
                status: status.code().unwrap_or(1),
                stdout: String::new(),
                stderr: String::new(),
            }
        );
        Ok(())
    }

    /// Run `cmd` and parse its captured output as JSON.
    pub fn output_json(&self, cmd: &Cmd) -> Result<serde_json::Value> {
        let text = self.output(cmd)?;
        serde_json::from_str(&text).context(error::OutputJsonSnafu {
            command: self.render(cmd),
        })
    }

    /// Run `cmd` repeatedly until its output satisfies `expectation` or
    /// `timeout` elapses. See [`poll`] for the polling contract.
    pub fn wait_for(&self, cmd: &Cmd, expectation: &Expectation, timeout: Duration) -> Result<()> {
        match poll(|| self.output(cmd), expectation, timeout) {
            PollOutcome::Satisfied => Ok(()),
            PollOutcome::TimedOut => error::WaitTimeoutSnafu {
                command: self.render(cmd),
                expectation: expectation.to_string(),
                timeout,
            }
            .fail(),
            PollOutcome::ExecutionFailed(e) => Err(e).context(error::WaitExecutionSnafu {
                command: self.render(cmd),
                timeout,
            }),
        }
    }

    /// Wait until the output of `cmd` equals `expected` exactly.
    pub fn wait_for_output(&self, cmd: &Cmd, expected: &str, timeout: Duration) -> Result<()> {
        self.wait_for(cmd, &Expectation::exact(expected), timeout)
    }

    /// Wait until the output of `cmd` contains `expected`.
    pub fn wait_for_output_contains(
        &self,
        cmd: &Cmd,
        expected: &str,
        timeout: Duration,
    ) -> Result<()> {
        self.wait_for(cmd, &Expectation::contains(expected), timeout)
    }

    /// Wait until the output of `cmd` matches `pattern`. A malformed pattern
    /// is reported before any polling happens.
    pub fn wait_for_output_pattern(
        &self,
        cmd: &Cmd,
        pattern: &str,
        timeout: Duration,
    ) -> Result<()> {
        self.wait_for(cmd, &Expectation::pattern(pattern)?, timeout)
    }

    fn command(&self, cmd: &Cmd) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(kubeconfig) = &self.kubeconfig {
            command.arg("--kubeconfig").arg(kubeconfig);
        }
        command.args(cmd.to_args());
        command
    }

    fn render(&self, cmd: &Cmd) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        if let Some(kubeconfig) = &self.kubeconfig {
            parts.push("--kubeconfig".to_string());
            parts.push(kubeconfig.to_string_lossy().to_string());
        }
        parts.extend(cmd.to_args());
        parts.join(" ")
    }

    fn check(&self, command: &str, output: &Output) -> Result<()> {
        ensure!(
            output.status.success(),
            error::CommandFailedSnafu {
                command,
                status: output.status.code().unwrap_or(1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }
        );
        Ok(())
    }
}
