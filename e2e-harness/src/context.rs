use crate::error::{self, Result};
use crate::log_dump::LogDump;
use crate::sanitize;
use crate::settings::Settings;
use kubectl::{Cmd, Kubectl};
use log::{error, info};
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A namespace-scoped test context. Set the namespace once and every command
/// issued through the context is scoped to it. The `*_and_log` variants
/// additionally log the step description, number the step, and dump
/// diagnostics for the namespace into the step's log directory whether or
/// not the step succeeded.
///
/// The step counter is owned by the context and increases monotonically; the
/// context itself is meant for sequential test steps, not for concurrent use
/// against the same namespace.
#[derive(Debug)]
pub struct TestNamespace {
    namespace: String,
    suite_name: String,
    log_dir: PathBuf,
    step_counter: AtomicUsize,
    kubectl: Kubectl,
    settings: Settings,
}

impl TestNamespace {
    /// Create a context for `namespace`. The suite log directory
    /// `<base>/<suite>/<datetime>` is created eagerly so a bad location shows
    /// up here rather than in the middle of a run.
    pub fn new<S1, S2>(
        suite_name: S1,
        namespace: S2,
        kubectl: Kubectl,
        settings: Settings,
    ) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let suite_name = suite_name.into();
        let log_dir = sanitize::suite_log_dir(&settings.base_log_dir, &suite_name);
        fs::create_dir_all(&log_dir).context(error::CreateLogDirSnafu {
            path: log_dir.clone(),
        })?;
        Ok(Self {
            namespace: namespace.into(),
            suite_name,
            log_dir,
            step_counter: AtomicUsize::new(1),
            kubectl,
            settings,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn kubectl(&self) -> &Kubectl {
        &self.kubectl
    }

    /// Run `cmd` scoped to the namespace, streaming output to the console.
    pub fn exec(&self, cmd: Cmd) -> Result<()> {
        self.kubectl
            .run(&self.scoped(cmd))
            .context(error::CommandSnafu)
    }

    /// Run `cmd` scoped to the namespace and capture its trimmed output.
    pub fn output(&self, cmd: Cmd) -> Result<String> {
        self.kubectl
            .output(&self.scoped(cmd))
            .context(error::CommandSnafu)
    }

    /// Run `cmd` scoped to the namespace and parse its output as JSON.
    pub fn output_json(&self, cmd: Cmd) -> Result<serde_json::Value> {
        self.kubectl
            .output_json(&self.scoped(cmd))
            .context(error::CommandSnafu)
    }

    /// Wait until the output of `cmd` equals `expected` exactly.
    pub fn wait_for_output(&self, cmd: Cmd, expected: &str, timeout: Duration) -> Result<()> {
        self.kubectl
            .wait_for_output(&self.scoped(cmd), expected, timeout)
            .context(error::CommandSnafu)
    }

    /// Wait until the output of `cmd` contains `expected`.
    pub fn wait_for_output_contains(
        &self,
        cmd: Cmd,
        expected: &str,
        timeout: Duration,
    ) -> Result<()> {
        self.kubectl
            .wait_for_output_contains(&self.scoped(cmd), expected, timeout)
            .context(error::CommandSnafu)
    }

    /// Wait until the output of `cmd` matches `pattern`.
    pub fn wait_for_output_pattern(
        &self,
        cmd: Cmd,
        pattern: &str,
        timeout: Duration,
    ) -> Result<()> {
        self.kubectl
            .wait_for_output_pattern(&self.scoped(cmd), pattern, timeout)
            .context(error::CommandSnafu)
    }

    /// [`Self::exec`] as a numbered, diagnostics-dumping step.
    pub fn exec_and_log(&self, description: &str, cmd: Cmd) -> Result<()> {
        let _dump = self.step(description);
        self.kubectl
            .run(&self.scoped(cmd))
            .context(error::StepSnafu { step: description })
    }

    /// [`Self::output`] as a numbered, diagnostics-dumping step.
    pub fn output_and_log(&self, description: &str, cmd: Cmd) -> Result<String> {
        let _dump = self.step(description);
        self.kubectl
            .output(&self.scoped(cmd))
            .context(error::StepSnafu { step: description })
    }

    /// [`Self::wait_for_output`] as a numbered, diagnostics-dumping step.
    pub fn wait_for_output_and_log(
        &self,
        description: &str,
        cmd: Cmd,
        expected: &str,
        timeout: Duration,
    ) -> Result<()> {
        let _dump = self.step(description);
        self.kubectl
            .wait_for_output(&self.scoped(cmd), expected, timeout)
            .context(error::StepSnafu { step: description })
    }

    /// [`Self::wait_for_output_contains`] as a numbered, diagnostics-dumping
    /// step.
    pub fn wait_for_output_contains_and_log(
        &self,
        description: &str,
        cmd: Cmd,
        expected: &str,
        timeout: Duration,
    ) -> Result<()> {
        let _dump = self.step(description);
        self.kubectl
            .wait_for_output_contains(&self.scoped(cmd), expected, timeout)
            .context(error::StepSnafu { step: description })
    }

    /// [`Self::wait_for_output_pattern`] as a numbered, diagnostics-dumping
    /// step.
    pub fn wait_for_output_pattern_and_log(
        &self,
        description: &str,
        cmd: Cmd,
        pattern: &str,
        timeout: Duration,
    ) -> Result<()> {
        let _dump = self.step(description);
        self.kubectl
            .wait_for_output_pattern(&self.scoped(cmd), pattern, timeout)
            .context(error::StepSnafu { step: description })
    }

    /// Clean up and delete the namespace, unless the settings say to keep it.
    pub fn terminate(&self) -> Result<()> {
        if self.settings.keep_namespace {
            info!("Skipping namespace cleanup and deletion.");
            return Ok(());
        }
        info!("Cleaning up and deleting namespace.");
        // Always try to delete workload resources in case the test failed out
        // before a delete step. Deleting the namespace itself can hang while
        // operator-managed resources are left holding finalizers.
        for resource in &self.settings.cleanup_resources {
            let cmd = Cmd::delete(resource.as_str()).arg("--all");
            if let Err(e) = self.kubectl.run(&self.scoped(cmd)) {
                error!(
                    "unable to delete {} in namespace '{}': {}",
                    resource, self.namespace, e
                );
            }
        }
        self.kubectl
            .run(&Cmd::delete_by_type_and_name(
                "namespace",
                self.namespace.as_str(),
            ))
            .context(error::CommandSnafu)
    }

    fn scoped(&self, cmd: Cmd) -> Cmd {
        cmd.in_namespace(self.namespace.as_str())
    }

    /// Start a numbered step: log the description and return the guard that
    /// dumps diagnostics when the step's scope exits.
    fn step(&self, description: &str) -> LogDump {
        info!("{}", description);
        LogDump::new(
            self.kubectl.clone(),
            self.namespace.as_str(),
            self.step_log_dir(description),
        )
    }

    fn step_log_dir(&self, description: &str) -> PathBuf {
        let step = self.step_counter.fetch_add(1, Ordering::SeqCst);
        self.log_dir.join(format!(
            "{:02}_{}",
            step,
            sanitize::sanitize_for_log_dirs(description)
        ))
    }
}
