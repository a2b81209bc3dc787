use std::time::Duration;

use bytes::Bytes;
use strata_backend::{ObjectStore, Registry, Service};
use strata_manifest::{ChunkRecord, EncryptionMeta, FileMeta, Manifest, ManifestBuilder};
use strata_verify::digest_hex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::plan::ChunkPlan;
use crate::policy::PartitionTable;
use crate::progress::{DownloadProgressFn, DownloadTracker, UploadProgressFn, UploadTracker};
use crate::reassemble::{reassemble, verify_chunk};
use crate::scheduler::{MAX_CONCURRENT_OPS, MAX_RETRIES, RETRY_BASE_DELAY, Scheduler};

/// Tuning for one transfer. The defaults mirror the scheduler constants;
/// the partition table is a policy parameter, not a structural one.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub partition: PartitionTable,
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            partition: PartitionTable::default(),
            batch_size: MAX_CONCURRENT_OPS,
            max_retries: MAX_RETRIES,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }
}

impl TransferOptions {
    #[must_use]
    pub fn partition(mut self, partition: PartitionTable) -> Self {
        self.partition = partition;
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler {
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            base_delay: self.retry_base_delay,
        }
    }
}

/// Shard an already-encrypted payload across the registry's backends and
/// publish the manifest. The returned content identifier is the only
/// artifact a caller needs to reconstruct the payload later.
pub async fn upload_sharded<S: ObjectStore>(
    registry: &Registry<S>,
    payload: Bytes,
    file: FileMeta,
    encryption: EncryptionMeta,
    options: &TransferOptions,
    on_progress: Option<UploadProgressFn>,
) -> Result<String> {
    // Zero configured backends fails here, before any network call.
    registry.primary()?;

    let plan = ChunkPlan::for_payload(&payload);
    let total = plan.total_chunks();
    info!(
        total,
        chunk_size = plan.chunk_size,
        file = %file.file_name,
        "starting sharded upload"
    );

    let assignments: Vec<Service> = plan
        .chunks
        .iter()
        .map(|chunk| options.partition.service_for(chunk.index))
        .collect();
    let tracker = UploadTracker::spawn(&assignments, on_progress);

    let ops = plan
        .chunks
        .iter()
        .map(|chunk| {
            let index = chunk.index;
            let service = options.partition.service_for(index);
            let checksum = digest_hex(&chunk.data);
            let name = format!("{}.part{}", file.file_name, index);
            let data = chunk.data.clone();
            let op = move |_attempt: u32| {
                let data = data.clone();
                let name = name.clone();
                let checksum = checksum.clone();
                async move {
                    let store = registry
                        .by_service(service)
                        .ok_or(Error::ServiceMissing { index, service })?;
                    let stored = store.put(data, &name).await.map_err(Error::Backend)?;
                    Ok(ChunkRecord {
                        index,
                        service: stored.service,
                        cid: stored.cid,
                        checksum,
                        size: stored.size,
                    })
                }
            };
            (index, op)
        })
        .collect();

    let outcome = options
        .scheduler()
        .run(ops, |_, record: &ChunkRecord| tracker.emit(record.service))
        .await;
    tracker.finish().await;
    let results = outcome?;

    // Manifest construction waits for the whole plan; the builder enforces
    // that no record is missing or unmaterialized.
    let mut builder = ManifestBuilder::new(total, plan.chunk_size, file, encryption);
    for (_, record) in results {
        builder.record(record)?;
    }
    let manifest = builder.build()?;

    publish_manifest(registry, &manifest).await
}

/// Serialize a manifest and store it on the registry's primary backend.
/// The manifest goes to one designated service; the partition policy does
/// not apply to it.
pub async fn publish_manifest<S: ObjectStore>(
    registry: &Registry<S>,
    manifest: &Manifest,
) -> Result<String> {
    let json = manifest.to_json()?;
    let name = format!("{}.manifest.json", manifest.file_name);
    let primary = registry.primary()?;
    debug!(service = %primary.service(), name, "publishing manifest");
    let stored = primary.put(Bytes::from(json), &name).await?;
    info!(cid = %stored.cid, "manifest published");
    Ok(stored.cid)
}

/// Fetch and validate a manifest by its content identifier, trying every
/// backend. A manifest that fails validation is unusable; no chunk
/// download is attempted for it.
pub async fn fetch_manifest<S: ObjectStore>(
    registry: &Registry<S>,
    manifest_cid: &str,
) -> Result<Manifest> {
    let object = registry.download_with_fallback(manifest_cid).await?;
    let text = std::str::from_utf8(&object.bytes).map_err(|e| {
        Error::Manifest(strata_manifest::Error::Invalid(format!(
            "manifest is not utf-8: {e}"
        )))
    })?;
    Ok(Manifest::from_json(text)?)
}

/// Download every chunk a manifest records, each from the service it was
/// stored on, verifying checksums as they arrive.
pub async fn download_chunks<S: ObjectStore>(
    registry: &Registry<S>,
    records: &[ChunkRecord],
    options: &TransferOptions,
    on_progress: Option<DownloadProgressFn>,
) -> Result<Vec<(u32, Bytes)>> {
    let tracker = DownloadTracker::spawn(records.len() as u32, on_progress);

    let ops = records
        .iter()
        .map(|record| {
            let index = record.index;
            let op = move |_attempt: u32| async move {
                if !record.is_materialized() {
                    // The upstream object was never finalized; do not
                    // attempt a network call for it.
                    return Err(Error::ChunkNotReady { index });
                }
                let store = registry.by_service(record.service).ok_or(Error::ServiceMissing {
                    index,
                    service: record.service,
                })?;
                let object = store.get(&record.cid).await.map_err(Error::Backend)?;
                verify_chunk(record, &object.bytes)?;
                Ok(object.bytes)
            };
            (index, op)
        })
        .collect();

    let outcome = options
        .scheduler()
        .run(ops, |index, _: &Bytes| tracker.emit(index))
        .await;
    tracker.finish().await;
    outcome
}

/// Reconstruct the payload a manifest describes: fetch and validate the
/// manifest, download all chunks, verify, sort and concatenate. Returns
/// the original (still encrypted) byte sequence exactly.
pub async fn download_sharded<S: ObjectStore>(
    registry: &Registry<S>,
    manifest_cid: &str,
    options: &TransferOptions,
    on_progress: Option<DownloadProgressFn>,
) -> Result<Bytes> {
    let manifest = fetch_manifest(registry, manifest_cid).await?;
    info!(
        total = manifest.total_chunks,
        file = %manifest.file_name,
        "starting sharded download"
    );
    let parts = download_chunks(registry, &manifest.chunks, options, on_progress).await?;
    reassemble(parts, manifest.stored_size())
}
