/*!

A minimal smoke suite showing how the harness drives an operator test: point
it at a cluster (the current kubeconfig), give it a namespace, and run logged
steps against it. Each step's diagnostics land under `build/kubectl_dump`.

```text
cargo run --example operator_smoke -- widget-smoke
```

Set `E2E_HARNESS_KEEP_NAMESPACE=true` to look around after a failed run.

!*/

use anyhow::{Context, Result};
use e2e_harness::{Settings, TestNamespace};
use kubectl::{Cmd, Kubectl};
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let namespace = std::env::args()
        .nth(1)
        .context("usage: operator_smoke <namespace>")?;

    let kubectl = Kubectl::new();
    kubectl.run(&Cmd::new("create").args(["namespace", namespace.as_str()]))?;

    let settings = Settings::from_env()?;
    let ns = TestNamespace::new("operator smoke", namespace, kubectl, settings)?;

    ns.exec_and_log(
        "create a sleeper deployment",
        Cmd::new("create").args([
            "deployment",
            "sleeper",
            "--image=public.ecr.aws/docker/library/busybox:1.36",
            "--",
            "sleep",
            "3600",
        ]),
    )?;
    ns.wait_for_ready_pod_count("app=sleeper", 1, Duration::from_secs(300))?;
    ns.wait_for_output_pattern_and_log(
        "check the deployment reports available replicas",
        Cmd::get_by_type_and_name("deployment", "sleeper")
            .format_output("jsonpath={.status.availableReplicas}"),
        r"^[1-9][0-9]*$",
        Duration::from_secs(60),
    )?;
    ns.terminate()?;
    Ok(())
}
