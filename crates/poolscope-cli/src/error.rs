use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] poolscope_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Preference(#[from] poolscope_core::PreferenceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Preference(_) => 10,
        }
    }
}
