use crate::error::{self, Result};
use serde::Deserialize;
use snafu::ResultExt;
use std::path::PathBuf;

/// Harness configuration, passed explicitly to [`crate::TestNamespace::new`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Skip namespace cleanup and deletion during
    /// [`crate::TestNamespace::terminate`]. Useful for poking at the
    /// aftermath of a failed run.
    pub keep_namespace: bool,

    /// Base directory for per-step diagnostic dumps.
    pub base_log_dir: PathBuf,

    /// Resource types deleted with `--all` before the namespace itself.
    /// Namespace deletion can hang while operator-managed resources are left
    /// holding finalizers, so suites list their workload types here.
    pub cleanup_resources: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            keep_namespace: false,
            base_log_dir: PathBuf::from("build/kubectl_dump"),
            cleanup_resources: Vec::new(),
        }
    }
}

impl Settings {
    /// Read settings from `E2E_HARNESS_*` environment variables. Anything not
    /// set in the environment keeps its default.
    ///
    /// # Example
    ///
    /// ```text
    /// E2E_HARNESS_KEEP_NAMESPACE=true
    /// E2E_HARNESS_BASE_LOG_DIR=/tmp/kubectl_dump
    /// E2E_HARNESS_CLEANUP_RESOURCES=widgets,gadgets
    /// ```
    pub fn from_env() -> Result<Self> {
        envy::prefixed("E2E_HARNESS_")
            .from_env()
            .context(error::EnvSettingsSnafu)
    }
}
