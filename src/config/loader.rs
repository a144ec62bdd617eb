use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::ConfigFile;

/// Config files picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["swarmbench.toml", "swarmbench.json"];

/// Loads a configuration file from the provided path or default locations.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = path {
        return load_config_file(Path::new(path)).map(Some);
    }

    for candidate in DEFAULT_CONFIG_FILES {
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            return load_config_file(&candidate).map(Some);
        }
    }

    Ok(None)
}

/// Parses a `.toml` or `.json` config file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has another extension or
/// does not parse.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|err| ConfigError::ReadConfig {
        path: path.to_path_buf(),
        source: err,
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: err,
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source: err,
        }),
        Some(ext) => Err(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        }),
        None => Err(ConfigError::MissingExtension),
    }
}
