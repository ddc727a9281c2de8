//! Waiters over pods and labels that operator suites keep reaching for,
//! expressed as jsonpath queries through the namespace context.

use crate::error::Result;
use crate::TestNamespace;
use kubectl::Cmd;
use std::time::Duration;

impl TestNamespace {
    /// Wait until the first running pod matching `label` reports its first
    /// container ready.
    pub fn wait_for_operator_ready(&self, label: &str, timeout: Duration) -> Result<()> {
        let step = "waiting for the operator to become ready";
        let cmd = Cmd::get("pods")
            .with_label(label)
            .with_flag("field-selector", "status.phase=Running")
            .format_output("jsonpath={.items[0].status.containerStatuses[0].ready}");
        self.wait_for_output_and_log(step, cmd, "true", timeout)
    }

    /// Wait until no pods matching `label` remain.
    pub fn wait_for_no_pods(&self, label: &str, timeout: Duration) -> Result<()> {
        let step = "checking that no pods remain";
        let cmd = Cmd::get("pods")
            .with_label(label)
            .format_output("jsonpath={.items}");
        self.wait_for_output_and_log(step, cmd, "[]", timeout)
    }

    /// Wait until exactly `count` running pods matching `label` report their
    /// first container ready.
    pub fn wait_for_ready_pod_count(
        &self,
        label: &str,
        count: usize,
        timeout: Duration,
    ) -> Result<()> {
        let step = "waiting for pods to become ready";
        let cmd = Cmd::get("pods")
            .with_label(label)
            .with_flag("field-selector", "status.phase=Running")
            .format_output("jsonpath={.items[*].status.containerStatuses[0].ready}");
        self.wait_for_output_and_log(step, cmd, &repeat_join("true", count), timeout)
    }

    /// Wait until the pod named `pod` carries `label`.
    pub fn wait_for_pod_labeled(&self, pod: &str, label: &str, timeout: Duration) -> Result<()> {
        let step = "verify that the pod is labeled";
        let cmd = Cmd::get("pods")
            .with_flag("field-selector", format!("metadata.name={}", pod))
            .with_label(label)
            .format_output("jsonpath={.items[*].metadata.name}");
        self.wait_for_output_and_log(step, cmd, pod, timeout)
    }

    /// Wait until the pod named `pod` no longer carries `label`. An empty
    /// result asserts absence.
    pub fn wait_for_pod_label_gone(&self, pod: &str, label: &str, timeout: Duration) -> Result<()> {
        let step = "verify that the pod is no longer labeled";
        let cmd = Cmd::get("pods")
            .with_flag("field-selector", format!("metadata.name={}", pod))
            .with_label(label)
            .format_output("jsonpath={.items[*].metadata.name}");
        self.wait_for_output_and_log(step, cmd, "", timeout)
    }

    /// Names of the pods matching `label`, sorted.
    pub fn pod_names(&self, label: &str) -> Result<Vec<String>> {
        let cmd = Cmd::get("pods")
            .with_label(label)
            .format_output("jsonpath={.items[*].metadata.name}");
        let output = self.output(cmd)?;
        let mut names: Vec<String> = output.split_whitespace().map(str::to_string).collect();
        names.sort();
        Ok(names)
    }

    /// The named object as parsed JSON, for ad-hoc assertions on spec and
    /// status fields.
    pub fn get_json(&self, kind: &str, name: &str) -> Result<serde_json::Value> {
        self.output_json(Cmd::get_by_type_and_name(kind, name).format_output("json"))
    }
}

fn repeat_join(value: &str, count: usize) -> String {
    vec![value; count].join(" ")
}
