use crate::error::{Error, Result};
use crate::record::{ChunkRecord, MANIFEST_VERSION, Manifest};

/// Caller-supplied file metadata recorded in the manifest.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub file_name: String,
    /// Payload length before encryption.
    pub original_size: u64,
}

/// Opaque key material from the external encryption collaborator.
#[derive(Debug, Clone, Default)]
pub struct EncryptionMeta {
    pub key: String,
    pub iv: String,
}

/// Slot-per-index accumulator for chunk records.
///
/// `build` succeeds only once every index in `[0, total_chunks)` holds a
/// materialized record. This is the all-or-nothing invariant made
/// explicit: a manifest cannot exist, even in memory, while any chunk
/// upload is unaccounted for.
#[derive(Debug)]
pub struct ManifestBuilder {
    total_chunks: u32,
    chunk_size: u64,
    file: FileMeta,
    encryption: EncryptionMeta,
    slots: Vec<Option<ChunkRecord>>,
}

impl ManifestBuilder {
    pub fn new(
        total_chunks: u32,
        chunk_size: u64,
        file: FileMeta,
        encryption: EncryptionMeta,
    ) -> Self {
        Self {
            total_chunks,
            chunk_size,
            file,
            encryption,
            slots: vec![None; total_chunks as usize],
        }
    }

    /// Record one completed chunk upload. Rejects indexes outside the
    /// plan, double recording, and sentinel (empty) content identifiers.
    pub fn record(&mut self, record: ChunkRecord) -> Result<()> {
        if record.index >= self.total_chunks {
            return Err(Error::IndexOutOfRange {
                index: record.index,
                total: self.total_chunks,
            });
        }
        if !record.is_materialized() {
            return Err(Error::NotMaterialized(record.index));
        }
        let slot = &mut self.slots[record.index as usize];
        if slot.is_some() {
            return Err(Error::DuplicateIndex(record.index));
        }
        *slot = Some(record);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Produce the immutable manifest. Fails while any slot is empty.
    pub fn build(self) -> Result<Manifest> {
        let missing = self.remaining();
        if missing > 0 {
            return Err(Error::Incomplete {
                missing,
                total: self.total_chunks,
            });
        }
        let chunks = self.slots.into_iter().flatten().collect();
        let manifest = Manifest {
            version: MANIFEST_VERSION.into(),
            total_chunks: self.total_chunks,
            chunk_size: self.chunk_size,
            original_size: self.file.original_size,
            file_name: self.file.file_name,
            encryption_key: self.encryption.key,
            encryption_iv: self.encryption.iv,
            chunks,
        };
        manifest.validate()?;
        Ok(manifest)
    }
}
