use bytes::Bytes;

/// Minimum chunk count the sizing targets, so every backend in the default
/// partition table receives at least one chunk for non-trivial payloads.
pub const MIN_CHUNK_COUNT: u64 = 5;

/// Hard floor on chunk size even for tiny payloads.
pub const ABSOLUTE_FLOOR: u64 = 10 * 1024;

/// Preferred lower bound once a payload is big enough to fill all slots.
pub const MIN_CHUNK_SIZE: u64 = 50 * 1024;

/// Upper bound; beyond this the chunk count grows instead.
pub const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

/// Chunk size for a payload, as a pure function of its length.
///
/// Small payloads (under `MIN_CHUNK_COUNT * MIN_CHUNK_SIZE`) aim for
/// `MIN_CHUNK_COUNT` chunks but never go below [`ABSOLUTE_FLOOR`]; larger
/// payloads clamp the same target into `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`.
pub fn chunk_size_for(payload_size: u64) -> u64 {
    let target = payload_size.div_ceil(MIN_CHUNK_COUNT);
    if payload_size < MIN_CHUNK_COUNT * MIN_CHUNK_SIZE {
        target.max(ABSOLUTE_FLOOR)
    } else {
        target.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
    }
}

/// One contiguous slice of the payload. Transient; exists only for the
/// duration of a transfer.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: u32,
    pub data: Bytes,
}

/// The ordered chunk set for one upload.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub chunk_size: u64,
    pub chunks: Vec<Chunk>,
}

impl ChunkPlan {
    /// Split a payload with the sizing rule above. Chunks are ordered,
    /// contiguous and non-overlapping; only the last may be short.
    pub fn for_payload(payload: &Bytes) -> Self {
        let chunk_size = chunk_size_for(payload.len() as u64);
        Self {
            chunk_size,
            chunks: split_into_chunks(payload, chunk_size),
        }
    }

    pub fn total_chunks(&self) -> u32 {
        self.chunks.len() as u32
    }
}

/// Slice `payload` into ranges of `chunk_size` bytes. Slicing `Bytes` is
/// cheap; no chunk copies the payload.
pub fn split_into_chunks(payload: &Bytes, chunk_size: u64) -> Vec<Chunk> {
    let size = chunk_size as usize;
    let mut chunks = Vec::with_capacity(payload.len().div_ceil(size.max(1)));
    let mut offset = 0;
    let mut index = 0u32;
    while offset < payload.len() {
        let end = (offset + size).min(payload.len());
        chunks.push(Chunk {
            index,
            data: payload.slice(offset..end),
        });
        offset = end;
        index += 1;
    }
    chunks
}
