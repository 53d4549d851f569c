use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialReviewError {
    #[error("Required line item not found: {0}")]
    MissingLineItem(String),

    #[error("Invalid change threshold {0}: must be a finite, non-negative fraction")]
    InvalidThreshold(f64),

    #[error("Invalid keyword index: {0}")]
    InvalidKeywordIndex(String),

    #[error("Narrative generation failed: {0}")]
    NarrativeFailed(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FinancialReviewError>;
