#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structural validation failure. The manifest must be treated as
    /// unusable; partial reconstruction is never attempted.
    #[error("manifest invalid: {0}")]
    Invalid(String),

    #[error("chunk index {index} out of range for {total} chunks")]
    IndexOutOfRange { index: u32, total: u32 },

    #[error("duplicate record for chunk index {0}")]
    DuplicateIndex(u32),

    #[error("chunk {0} has no content identifier and cannot be recorded")]
    NotMaterialized(u32),

    #[error("manifest incomplete: {missing} of {total} chunks unrecorded")]
    Incomplete { missing: usize, total: u32 },

    #[error("manifest serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
