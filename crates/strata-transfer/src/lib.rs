//! Sharded transfer core: chunk planning, deterministic distribution,
//! bounded-concurrency scheduling with retry, progress aggregation, and
//! all-or-nothing reconstruction with integrity checks.
//!
//! The two entry points are [`upload_sharded`] and [`download_sharded`].
//! An upload splits an already-encrypted payload into content-addressed
//! chunks, spreads them across backends per the [`PartitionTable`],
//! uploads them in batches, and publishes a manifest whose content
//! identifier is the caller's only handle. A download reverses the whole
//! thing and either returns the exact original bytes or a typed error;
//! there is no degraded mode.

pub use self::cipher::{Cipher, CipherError, Encrypted};
pub use self::error::{Error, Result};
pub use self::pipeline::{
    TransferOptions, download_chunks, download_sharded, fetch_manifest, publish_manifest,
    upload_sharded,
};
pub use self::plan::{
    ABSOLUTE_FLOOR, Chunk, ChunkPlan, MAX_CHUNK_SIZE, MIN_CHUNK_COUNT, MIN_CHUNK_SIZE,
    chunk_size_for, split_into_chunks,
};
pub use self::policy::PartitionTable;
pub use self::progress::{
    DownloadProgress, DownloadProgressFn, UploadProgress, UploadProgressFn,
};
pub use self::reassemble::reassemble;
pub use self::scheduler::{MAX_CONCURRENT_OPS, MAX_RETRIES, RETRY_BASE_DELAY, Scheduler};

mod cipher;
mod error;
mod pipeline;
mod plan;
mod policy;
mod progress;
mod reassemble;
mod scheduler;
