use strata_backend::Service;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] strata_backend::Error),

    #[error(transparent)]
    Manifest(#[from] strata_manifest::Error),

    /// A single chunk operation ran out of retries. This aborts the whole
    /// transfer; there is no partial-success mode.
    #[error("chunk {index} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        index: u32,
        attempts: u32,
        #[source]
        source: strata_backend::Error,
    },

    /// Downloaded bytes do not match the checksum recorded in the
    /// manifest. Hard failure; corrupted data is never returned.
    #[error("chunk {index} failed integrity check: {source}")]
    ChecksumMismatch {
        index: u32,
        #[source]
        source: strata_verify::VerifyError,
    },

    /// The manifest references a chunk whose upstream object was never
    /// finalized. Detected before any network call for that chunk.
    #[error("chunk {index} was never finalized upstream")]
    ChunkNotReady { index: u32 },

    #[error("manifest names {service} for chunk {index} but the registry has no such adapter")]
    ServiceMissing { index: u32, service: Service },

    #[error("a partition table needs at least one slot")]
    EmptyPartitionTable,

    #[error("reassembled payload is {actual} bytes but the manifest records {expected}")]
    SizeMismatch { expected: u64, actual: u64 },
}

impl Error {
    /// Only transport-level backend failures are worth retrying; integrity
    /// and structural failures are final on the first occurrence.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
