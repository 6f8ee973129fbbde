//! Reading and writing serde types as YAML or JSON files, chosen by extension.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("file '{0}' has no extension")]
    MissingFileExtension(PathBuf),
    #[error("unsupported file extension for file: {0}")]
    UnsupportedFileExtension(PathBuf),
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML (de)serialization failed: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigFileResult<T> = Result<T, ConfigFileError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> ConfigFileResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ConfigFileError::MissingFileExtension(path.to_path_buf()))?;

        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(ConfigFileError::UnsupportedFileExtension(path.to_path_buf()))
        }
    }
}

pub fn serialize<T: Serialize>(value: &T, format: ConfigFormat) -> ConfigFileResult<String> {
    Ok(match format {
        ConfigFormat::Yaml => serde_yml::to_string(value)?,
        ConfigFormat::Json => serde_json::to_string_pretty(value)?,
    })
}

pub fn deserialize<T: DeserializeOwned + 'static>(text: &str, format: ConfigFormat) -> ConfigFileResult<T> {
    Ok(match format {
        ConfigFormat::Yaml => serde_yml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
    })
}

pub fn load<T: DeserializeOwned + 'static>(path: impl AsRef<Path>) -> ConfigFileResult<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize(&text, format)
}

pub fn save<T: Serialize>(value: &T, path: impl AsRef<Path>) -> ConfigFileResult<()> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let text = serialize(value, format)?;
    std::fs::write(path, text).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
