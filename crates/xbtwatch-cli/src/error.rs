use thiserror::Error;
use xbtwatch_core::{ConfigError, EvaluateError, FetchError, MissingComponent, StoreError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] xbtwatch_core::ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Notify(#[from] xbtwatch_core::NotifyError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Wiring(#[from] MissingComponent),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// A rules file that fails to parse is bad input, not a storage fault.
impl From<StoreError> for CliError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(error) => Self::Validation(error),
            other => Self::Store(other),
        }
    }
}

impl From<EvaluateError> for CliError {
    fn from(error: EvaluateError) -> Self {
        match error {
            EvaluateError::Fetch(error) => Self::Fetch(error),
            EvaluateError::Store(error) => Self::from(error),
            EvaluateError::Notify(error) => Self::Notify(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) => 2,
            Self::Fetch(_) => 3,
            Self::Notify(_) => 4,
            Self::Store(_) | Self::Serialization(_) => 10,
            Self::Wiring(_) | Self::Logging(_) => 1,
        }
    }
}
