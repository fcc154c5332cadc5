use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Scoring attempted before a successful fit")]
    NotFitted,

    #[error("Query label not in trained vocabulary: {0}")]
    UnknownLabel(String),

    #[error("No doctors available to score")]
    EmptyDataset,

    #[error("Model artifact error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model training error: {0}")]
    Training(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
