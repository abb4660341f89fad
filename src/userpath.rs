use colored::Colorize;
use shellexpand::LookupError;
use std::{env::VarError, path::PathBuf};

/// A user specified path with `~` and `$VAR` expanded. Unlike a
/// canonicalized path, it does not have to exist yet.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPath {
    pub path_buf: PathBuf,
}

impl std::fmt::Debug for UserPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.path_buf.fmt(f)
    }
}

impl UserPath {
    pub fn expand(path: &str) -> Result<Self, LookupError<VarError>> {
        let expanded = shellexpand::full(path)?;
        Ok(UserPath {
            path_buf: PathBuf::from(expanded.as_ref()),
        })
    }
}

/// Tries to convert a given user path (as a string slice) to a `UserPath`.
/// If it fails, returns an error message.
pub fn to_user_path(path: &str) -> Result<UserPath, String> {
    UserPath::expand(path).map_err(|e| {
        format!(
            "{} {}\n{}",
            "Error resolving the given path:".red(),
            path,
            e.to_string().red()
        )
    })
}
