/*!

The bounded polling primitive used to await eventual consistency of cluster
state. [`poll`] repeatedly invokes an observation action until its text output
satisfies an [`Expectation`] or a deadline passes, sleeping a fixed interval
between attempts.

!*/

use crate::error::{self, Result};
use regex::Regex;
use snafu::ResultExt;
use std::fmt::{Display, Formatter};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Time slept between observation attempts.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The matching rule applied to observed text.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// Output equals the expected string exactly. `Exact("")` asserts that a
    /// query returned nothing, e.g. that no matching resources remain.
    Exact(String),
    /// The expected string is a substring of the output.
    Contains(String),
    /// The output matches the regular expression.
    Pattern(Regex),
}

impl Expectation {
    pub fn exact<S>(expected: S) -> Self
    where
        S: Into<String>,
    {
        Self::Exact(expected.into())
    }

    pub fn contains<S>(expected: S) -> Self
    where
        S: Into<String>,
    {
        Self::Contains(expected.into())
    }

    /// Compile `pattern` into an [`Expectation::Pattern`]. A malformed pattern
    /// is a configuration error reported here, before any polling happens.
    pub fn pattern<S>(pattern: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let pattern = pattern.as_ref();
        Ok(Self::Pattern(Regex::new(pattern).context(
            error::BadPatternSnafu { pattern },
        )?))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Exact(expected) => text == expected,
            Self::Contains(expected) => text.contains(expected.as_str()),
            Self::Pattern(regex) => regex.is_match(text),
        }
    }
}

impl Display for Expectation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(expected) => write!(f, "equal '{}'", expected),
            Self::Contains(expected) => write!(f, "contain '{}'", expected),
            Self::Pattern(regex) => write!(f, "match '{}'", regex),
        }
    }
}

/// The result of a bounded wait.
#[derive(Debug)]
pub enum PollOutcome<E> {
    /// The output satisfied the expectation before the deadline.
    Satisfied,
    /// The action produced output at least once, but the output never
    /// satisfied the expectation before the deadline.
    TimedOut,
    /// The action never once produced output; holds the most recent error.
    ExecutionFailed(E),
}

impl<E> PollOutcome<E> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// Invoke `action` until its output satisfies `expectation` or `timeout`
/// elapses, sleeping [`POLL_INTERVAL`] between attempts.
///
/// Execution errors are treated as transient while the deadline has not
/// passed; the observed resource may simply not exist yet. A timeout of zero
/// still performs one check, and a satisfying first observation returns
/// without any sleeping.
///
/// At the deadline the outcome distinguishes "never matched" from "never
/// executed successfully": if no attempt ever produced output, the most
/// recent error is returned as [`PollOutcome::ExecutionFailed`]; otherwise
/// the outcome is [`PollOutcome::TimedOut`].
pub fn poll<F, E>(mut action: F, expectation: &Expectation, timeout: Duration) -> PollOutcome<E>
where
    F: FnMut() -> std::result::Result<String, E>,
{
    let start = Instant::now();
    let mut observed = false;
    let mut last_error = None;
    loop {
        match action() {
            Ok(text) => {
                observed = true;
                last_error = None;
                if expectation.is_match(&text) {
                    return PollOutcome::Satisfied;
                }
            }
            Err(e) => last_error = Some(e),
        }
        if start.elapsed() >= timeout {
            return match last_error {
                Some(e) if !observed => PollOutcome::ExecutionFailed(e),
                _ => PollOutcome::TimedOut,
            };
        }
        sleep(POLL_INTERVAL);
    }
}
