//! Error types for decision engine

use adsignal_config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecisionError>;

#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Insufficient variants: need at least 2, got {0}")]
    InsufficientVariants(usize),

    #[error("Empty campaign set")]
    EmptyCampaignSet,

    #[error("Value out of range: {0}")]
    InvalidRange(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Statistical error: {0}")]
    StatisticalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for DecisionError {
    fn from(err: ConfigError) -> Self {
        DecisionError::InvalidConfig(err.to_string())
    }
}
