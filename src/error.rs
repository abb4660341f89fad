use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors that abort a packaging run.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("The source directory ('{}') does not exist.", .0.display())]
    SourceNotFound(PathBuf),

    #[error("The source path ('{}') exists, but is not a directory!", .0.display())]
    NotADirectory(PathBuf),

    #[error("The output path ('{}') exists, but is not a directory!", .0.display())]
    OutputNotADirectory(PathBuf),

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Could not write archive '{}': {source}", .path.display())]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PackError::Io {
            path: path.into(),
            source,
        }
    }

    /// The process exit code (sysexits) matching this error.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            PackError::SourceNotFound(_) | PackError::NotADirectory(_) => exitcode::NOINPUT,
            PackError::OutputNotADirectory(_) => exitcode::CANTCREAT,
            PackError::InvalidPattern { .. } => exitcode::USAGE,
            PackError::Io { .. } | PackError::Zip { .. } => exitcode::IOERR,
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_maps_to_noinput() {
        let err = PackError::SourceNotFound(PathBuf::from("templates"));
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
        assert!(err.to_string().contains("templates"));
    }

    #[test]
    fn io_failures_map_to_ioerr() {
        let err = PackError::io(
            "templates/a/file",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.exit_code(), exitcode::IOERR);
        assert!(err.to_string().contains("denied"));
    }
}
