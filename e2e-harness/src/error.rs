use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Command failed: {}", source))]
    Command { source: kubectl::Error },

    #[snafu(display("Could not create log directory '{}': {}", path.display(), source))]
    CreateLogDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Error parsing harness environment settings: {}", source))]
    EnvSettings { source: envy::Error },

    #[snafu(display("Step '{}' failed: {}", step, source))]
    Step {
        step: String,
        source: kubectl::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
