use snafu::Snafu;
use std::time::Duration;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid output pattern '{}': {}", pattern, source))]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },

    #[snafu(display(
        "'{}' failed with exit status '{}'\n\n{}\n\n{}",
        command,
        status,
        stdout,
        stderr
    ))]
    CommandFailed {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    #[snafu(display("Failed to run '{}': {}", command, source))]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("Output of '{}' was not valid JSON: {}", command, source))]
    OutputJson {
        command: String,
        source: serde_json::Error,
    },

    #[snafu(display(
        "'{}' never produced output while waiting {:?}: {}",
        command,
        timeout,
        source
    ))]
    WaitExecution {
        command: String,
        timeout: Duration,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    #[snafu(display(
        "Timeout waiting more than {:?} for output of '{}' to {}",
        timeout,
        command,
        expectation
    ))]
    WaitTimeout {
        command: String,
        expectation: String,
        timeout: Duration,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
