use thiserror::Error;

/// Errors produced while fingerprinting content.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The byte source could not be read to the end.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] std::io::Error),

    /// A hex-encoded content hash could not be parsed.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
}
