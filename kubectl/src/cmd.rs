use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A single `kubectl` invocation: a verb, its trailing arguments, and a set of
/// `--flag value` pairs. Building a `Cmd` has no side effects; nothing runs
/// until it is handed to [`crate::Kubectl`].
///
/// Flags are kept in a `BTreeMap` so a command renders the same argument
/// vector every time, which keeps logged command lines and test assertions
/// reproducible. Setting a flag twice keeps the latest value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
    verb: String,
    args: Vec<String>,
    flags: BTreeMap<String, String>,
}

impl Cmd {
    /// A command with an arbitrary verb, e.g. `Cmd::new("create")`.
    pub fn new<S>(verb: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    /// `kubectl get <resource>`
    pub fn get<S>(resource: S) -> Self
    where
        S: Into<String>,
    {
        Self::new("get").arg(resource)
    }

    /// `kubectl get <kind> <name>`
    pub fn get_by_type_and_name<S1, S2>(kind: S1, name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::new("get").arg(kind).arg(name)
    }

    /// `kubectl delete <resource>`
    pub fn delete<S>(resource: S) -> Self
    where
        S: Into<String>,
    {
        Self::new("delete").arg(resource)
    }

    /// `kubectl delete <kind> <name>`
    pub fn delete_by_type_and_name<S1, S2>(kind: S1, name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::new("delete").arg(kind).arg(name)
    }

    /// `kubectl apply -f <file> ...`
    pub fn apply_files<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("apply").file_args(paths)
    }

    /// `kubectl create -f <file> ...`
    pub fn create_from_files<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("create").file_args(paths)
    }

    /// `kubectl delete -f <file> ...`
    pub fn delete_from_files<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("delete").file_args(paths)
    }

    /// `kubectl create secret generic <name> --from-literal=<key>=<value> ...`
    pub fn create_secret_literal<S, I, K, V>(name: S, literals: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Display,
    {
        let mut cmd = Self::new("create").arg("secret").arg("generic").arg(name);
        for (key, value) in literals {
            cmd = cmd.arg(format!("--from-literal={}={}", key, value));
        }
        cmd
    }

    /// `kubectl logs <pod>`
    pub fn logs<S>(pod: S) -> Self
    where
        S: Into<String>,
    {
        Self::new("logs").arg(pod)
    }

    /// `kubectl exec <pod> <args> ...`, e.g.
    /// `Cmd::exec_on_pod("pod-0", ["--", "nodetool", "status"])`.
    pub fn exec_on_pod<S, I, A>(pod: S, args: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self::new("exec").arg(pod).args(args)
    }

    /// `kubectl patch <resource> --type merge --patch <data>`
    pub fn patch_merge<S1, S2>(resource: S1, data: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::new("patch")
            .arg(resource)
            .with_flag("type", "merge")
            .with_flag("patch", data)
    }

    /// `kubectl cluster-info dump --output-directory <dir> --namespaces <ns>`,
    /// which persists diagnostic logs for the namespace under `dir`.
    pub fn cluster_info_dump<P, S>(dir: P, namespace: S) -> Self
    where
        P: AsRef<Path>,
        S: Into<String>,
    {
        Self::new("cluster-info")
            .arg("dump")
            .with_flag("output-directory", dir.as_ref().to_string_lossy())
            .with_flag("namespaces", namespace)
    }

    /// Append one trailing argument.
    pub fn arg<S>(mut self, arg: S) -> Self
    where
        S: Into<String>,
    {
        self.args.push(arg.into());
        self
    }

    /// Append several trailing arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a `--name value` flag. Setting the same flag again replaces the
    /// earlier value.
    pub fn with_flag<S1, S2>(mut self, name: S1, value: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.flags.insert(name.into(), value.into());
        self
    }

    /// Set the label selector, `--selector <label>`.
    pub fn with_label<S>(self, label: S) -> Self
    where
        S: Into<String>,
    {
        self.with_flag("selector", label)
    }

    /// Set the output format, `--output <format>`, e.g. `jsonpath={.items}`.
    pub fn format_output<S>(self, format: S) -> Self
    where
        S: Into<String>,
    {
        self.with_flag("output", format)
    }

    /// Scope the command to a namespace, `--namespace <namespace>`. Scoping
    /// again replaces the earlier namespace, so the flag appears exactly once.
    pub fn in_namespace<S>(self, namespace: S) -> Self
    where
        S: Into<String>,
    {
        self.with_flag("namespace", namespace)
    }

    /// Render the full argument vector, not including the program itself.
    pub fn to_args(&self) -> Vec<String> {
        let mut rendered = Vec::with_capacity(1 + self.args.len() + 2 * self.flags.len());
        rendered.push(self.verb.clone());
        rendered.extend(self.args.iter().cloned());
        for (name, value) in &self.flags {
            rendered.push(format!("--{}", name));
            rendered.push(value.clone());
        }
        rendered
    }

    fn file_args<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self = self.arg("-f").arg(path);
        }
        self
    }
}

impl Display for Cmd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "kubectl {}", self.to_args().join(" "))
    }
}
