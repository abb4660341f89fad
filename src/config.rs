use serde::Deserialize;
use std::{
    fs,
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Name of the configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tpack.json";

/// Given the base configuration folder path, returns
/// the path of the configuration JSON file.
fn get_json_path(config_dir: &Path) -> PathBuf {
    config_dir.join("config.json")
}

/// Gets the user-level configuration file, namely
/// `(default config directory)/tpack/config.json`, where the default
/// configuration directory is given by the `dirs` crate.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| get_json_path(&dir.join("tpack")))
}

/// Packaging settings read from a JSON file. Every field is optional;
/// command line arguments take precedence over these.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub source: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub default_excludes: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration path ('{}') does not exist.", .0.display())]
    Missing(PathBuf),

    #[error("Configuration JSON path ('{}') exists, but is not a file!", .0.display())]
    NotAFile(PathBuf),

    #[error("Error opening the configuration JSON file ('{}') for reading: {source}", .path.display())]
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Error parsing the configuration JSON file: {source}\n\
        You can attempt to fix the file manually, or delete it.\n\
        The configuration file can be found in '{}'",
        .path.display()
    )]
    BadDeserialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Config {
    /// Reads the configuration at `json_path`. A missing file is `Ok(None)`.
    pub fn load_config(json_path: &Path) -> Result<Option<Config>, ConfigError> {
        if !json_path.exists() {
            return Ok(None);
        }
        if !json_path.is_file() {
            return Err(ConfigError::NotAFile(json_path.to_path_buf()));
        }
        let json_file = fs::File::open(json_path).map_err(|source| ConfigError::FileError {
            path: json_path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(json_file);
        serde_json::from_reader::<_, Config>(reader)
            .map_err(|source| ConfigError::BadDeserialization {
                path: json_path.to_path_buf(),
                source,
            })
            .map(Some)
    }

    /// Finds the configuration to use: the explicit path if one is given
    /// (which must exist), otherwise the first of `./tpack.json` and the
    /// user-level file that exists. No configuration at all is the default.
    pub fn discover(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Config::load_config(path)?.ok_or_else(|| ConfigError::Missing(path.into()));
        }
        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(user_config_path());
        Config::first_existing(candidates)
    }

    /// Loads the first of `candidates` that exists, or the default when none does.
    pub fn first_existing<I>(candidates: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for candidate in candidates {
            if let Some(config) = Config::load_config(&candidate)? {
                log::debug!("Using configuration from {}", candidate.display());
                return Ok(config);
            }
        }
        Ok(Config::default())
    }
}
