use ferrobuzz_core::{ConfigError, PipelineError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Pipeline(PipelineError::Validation(_)) => 2,
            Self::Pipeline(PipelineError::MissingData { .. }) => 3,
            Self::Pipeline(PipelineError::Io(_)) => 10,
            Self::Pipeline(_) => 4,
            Self::Serialization(_) => 5,
            Self::Config(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
