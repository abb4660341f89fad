pub mod pack;

use crate::{config::ConfigError, error::PackError};
use thiserror::Error;

/// Everything that can stop the `tpack` command.
#[derive(Debug, Error)]
pub enum CmdError {
    #[error("{0}")]
    Path(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("Could not write the report: {0}")]
    Report(#[from] serde_json::Error),
}

impl CmdError {
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            CmdError::Path(_) => exitcode::USAGE,
            CmdError::Config(_) => exitcode::CONFIG,
            CmdError::Pack(err) => err.exit_code(),
            CmdError::Report(_) => exitcode::IOERR,
        }
    }
}
