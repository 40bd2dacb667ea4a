use crate::error::{Error, Result};
use crate::signing::HashAlgorithm;
use crate::slsa::SchemaVersion;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BUILDER_ID: &str = "https://tekton.dev/chains/v2";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    #[default]
    Json,
    Cbor,
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEncoding::Json => write!(f, "json"),
            OutputEncoding::Cbor => write!(f, "cbor"),
        }
    }
}

impl FromStr for OutputEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputEncoding::Json),
            "cbor" => Ok(OutputEncoding::Cbor),
            other => Err(Error::Validation(format!(
                "Invalid output encoding '{other}'. Valid options are: json, cbor"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    /// PEM private key; statements are emitted unsigned without one.
    pub key_path: Option<PathBuf>,
    pub hash_alg: HashAlgorithm,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory the filesystem store writes to.
    pub path: Option<PathBuf>,
}

/// Generator configuration, usually read from a YAML file.
///
/// ```
/// use chains_provenance::config::Config;
/// use chains_provenance::slsa::SchemaVersion;
///
/// let config = Config::from_yaml("builder_id: https://ci.example/builder\nformat: slsa/v1\n").unwrap();
/// assert_eq!(config.builder_id, "https://ci.example/builder");
/// assert_eq!(config.format, SchemaVersion::V1);
/// assert!(config.signing.key_path.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub builder_id: String,
    pub format: SchemaVersion,
    pub output_encoding: OutputEncoding,
    pub signing: SigningConfig,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            builder_id: DEFAULT_BUILDER_ID.to_string(),
            format: SchemaVersion::default(),
            output_encoding: OutputEncoding::default(),
            signing: SigningConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(data: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(data)
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.builder_id.trim().is_empty() {
            return Err(Error::Config("builder_id cannot be empty".to_string()));
        }
        Ok(())
    }
}
