use serde::{Deserialize, Serialize};
use strata_backend::Service;

use crate::error::{Error, Result};

/// Manifest wire format version this build reads and writes.
pub const MANIFEST_VERSION: &str = "1.0";

/// One persisted chunk: where it lives and how to check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Position of the chunk within the payload, unique in
    /// `[0, total_chunks)`.
    pub index: u32,
    pub service: Service,
    /// Backend-issued content identifier. An empty string is the sentinel
    /// for "not yet materialized" and must never be treated as resolvable.
    pub cid: String,
    /// SHA-256 of the chunk bytes, lowercase hex.
    pub checksum: String,
    /// Chunk length in bytes.
    pub size: u64,
}

impl ChunkRecord {
    pub fn is_materialized(&self) -> bool {
        !self.cid.is_empty()
    }
}

/// The chunk map. Field names on the wire follow the manifest record
/// format: `totalChunks`, `chunkSize`, `originalSize`, `fileName`,
/// `encryptionKey`, `encryptionIV`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(rename = "totalChunks")]
    pub total_chunks: u32,
    #[serde(rename = "chunkSize")]
    pub chunk_size: u64,
    /// Payload length before encryption, in bytes.
    #[serde(rename = "originalSize")]
    pub original_size: u64,
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Opaque, backend-independent key material for the external
    /// decryption collaborator.
    #[serde(rename = "encryptionKey")]
    pub encryption_key: String,
    #[serde(rename = "encryptionIV")]
    pub encryption_iv: String,
    pub chunks: Vec<ChunkRecord>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate in one step; a manifest that fails validation is
    /// never handed to callers.
    pub fn from_json(text: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Ciphertext length this manifest describes: the sum of recorded
    /// chunk sizes.
    pub fn stored_size(&self) -> u64 {
        self.chunks.iter().map(|c| c.size).sum()
    }

    /// Structural validation. On failure the caller must abort; partial
    /// reconstruction from a bad manifest is never attempted.
    pub fn validate(&self) -> Result<()> {
        if self.version != MANIFEST_VERSION {
            return Err(Error::Invalid(format!(
                "unknown version {:?}, expected {MANIFEST_VERSION:?}",
                self.version
            )));
        }
        if self.chunks.len() != self.total_chunks as usize {
            return Err(Error::Invalid(format!(
                "{} chunk records for totalChunks={}",
                self.chunks.len(),
                self.total_chunks
            )));
        }
        let mut seen = vec![false; self.total_chunks as usize];
        for record in &self.chunks {
            let index = record.index;
            if index >= self.total_chunks {
                return Err(Error::Invalid(format!(
                    "chunk index {index} out of range for {} chunks",
                    self.total_chunks
                )));
            }
            if std::mem::replace(&mut seen[index as usize], true) {
                return Err(Error::Invalid(format!("duplicate chunk index {index}")));
            }
            if record.cid.is_empty() {
                return Err(Error::Invalid(format!("chunk {index} has an empty cid")));
            }
            if record.checksum.is_empty() {
                return Err(Error::Invalid(format!(
                    "chunk {index} has an empty checksum"
                )));
            }
        }
        Ok(())
    }
}
