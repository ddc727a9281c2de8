use kubectl::{Cmd, Kubectl};
use std::path::PathBuf;

/// Dumps diagnostic logs for a namespace when it goes out of scope, so a
/// logged test step persists its diagnostics on both the success and failure
/// paths. Dump failures are reported to stderr, never propagated.
#[derive(Debug)]
pub struct LogDump {
    kubectl: Kubectl,
    namespace: String,
    dir: PathBuf,
}

impl LogDump {
    pub fn new<S, P>(kubectl: Kubectl, namespace: S, dir: P) -> Self
    where
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            kubectl,
            namespace: namespace.into(),
            dir: dir.into(),
        }
    }
}

impl Drop for LogDump {
    fn drop(&mut self) {
        let cmd = Cmd::cluster_info_dump(&self.dir, self.namespace.as_str());
        if let Err(e) = self.kubectl.run(&cmd) {
            eprintln!(
                "unable to dump diagnostic logs to '{}': {}",
                self.dir.display(),
                e
            );
        }
    }
}
