//! Configuration file helpers

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read or decode a configuration file
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the target type
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON configuration file into `T`
///
/// Fields missing from the file take their `#[serde(default)]` values, so a
/// partial file only overrides what it names.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigFileError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "read config file");

    serde_json::from_str(&raw).map_err(|source| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default)]
        retries: u32,
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "dashboard"}}"#).unwrap();

        let sample: Sample = load_json_config(file.path()).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "dashboard".to_string(),
                retries: 0
            }
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_json_config::<Sample>("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigFileError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_json_config::<Sample>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse { .. }));
    }
}
