/*!

Builds and runs `kubectl` commands for end-to-end tests.

A [`Cmd`] describes a single `kubectl` invocation without running anything.
A [`Kubectl`] executes commands, either capturing their output or streaming
it to the console. The [`wait`] module provides the bounded polling primitive
used to await eventual consistency of cluster state: run a command until its
output satisfies an [`Expectation`] or a deadline passes.

!*/

mod cmd;
mod error;
mod exec;
pub mod wait;

pub use cmd::Cmd;
pub use error::{Error, Result};
pub use exec::Kubectl;
pub use wait::{poll, Expectation, PollOutcome};
