/*!

Namespace-scoped helpers for end-to-end testing of a Kubernetes operator.

A [`TestNamespace`] issues `kubectl` commands scoped to one namespace, polls
for expected output, and dumps diagnostic logs around each numbered test
step. Teardown deletes the namespace (and the workload resources that would
otherwise hang its deletion), unless the [`Settings`] say to keep it around
for debugging.

The command layer lives in the [`kubectl`] crate; this crate owns the test
context, step logging, and teardown.

!*/

mod context;
mod error;
mod log_dump;
mod pods;
mod sanitize;
mod settings;

pub use context::TestNamespace;
pub use error::{Error, Result};
pub use log_dump::LogDump;
pub use settings::Settings;
