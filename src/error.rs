use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

use crate::process::ExitStatus;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling the errors encountered while writing
/// changelogs, committing them, or gating a release on a test run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file: {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("fatal I/O error")]
    Io(#[from] std::io::Error),

    #[error("failed to convert date to string format")]
    TimeFormat(#[from] time::error::Format),

    #[error("failed to spawn `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed in {} with {status}", .directory.display())]
    Command {
        command: String,
        directory: PathBuf,
        status: ExitStatus,
    },

    #[error("tests failed in {} with {status}", .directory.display())]
    TestsFailed {
        directory: PathBuf,
        status: ExitStatus,
    },
}
