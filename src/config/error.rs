use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in config file {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Missing candle file entry '{0}'")]
    MissingCandleFile(String),
    #[error("Candle file entry '{0}' must be a path or a list holding one path")]
    InvalidCandleFile(String),
    #[error("Parameter axis '{0}' has no values")]
    EmptyAxis(String),
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),
    #[error("Invalid parameter values: {0}")]
    InvalidParameters(#[source] serde_json::Error),
}
