use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Grant #{index} does not exist ({len} grants)")]
    GrantIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid share URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
