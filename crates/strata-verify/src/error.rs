#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("checksum is not valid hex: {0}")]
    MalformedChecksum(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
