use thiserror::Error;

/// Boxed error returned by external collaborators such as material resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    /// The material resolver failed. This is the only error the statement
    /// factory itself produces; no partial statement accompanies it.
    #[error("materials could not be resolved: {0}")]
    MaterialsUnresolved(#[source] BoxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
