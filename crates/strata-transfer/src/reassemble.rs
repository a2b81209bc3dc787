use bytes::{Bytes, BytesMut};
use strata_manifest::ChunkRecord;
use strata_verify::verify_hex;

use crate::error::{Error, Result};

/// Recompute a downloaded chunk's checksum against the manifest record.
pub(crate) fn verify_chunk(record: &ChunkRecord, data: &[u8]) -> Result<()> {
    verify_hex(data, &record.checksum).map_err(|source| Error::ChecksumMismatch {
        index: record.index,
        source,
    })
}

/// Sort verified chunks by index and concatenate them contiguously.
///
/// Byte order is load-bearing: completions arrive in any order, so the
/// sort here is what restores the original layout. The result must match
/// the size the manifest records, with no gaps or overlaps.
pub fn reassemble(mut parts: Vec<(u32, Bytes)>, expected_size: u64) -> Result<Bytes> {
    parts.sort_by_key(|(index, _)| *index);
    let mut buffer = BytesMut::with_capacity(expected_size as usize);
    for (_, data) in &parts {
        buffer.extend_from_slice(data);
    }
    let actual = buffer.len() as u64;
    if actual != expected_size {
        return Err(Error::SizeMismatch {
            expected: expected_size,
            actual,
        });
    }
    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use strata_backend::Service;
    use strata_verify::digest_hex;

    use super::*;

    #[test]
    fn reassembles_out_of_order_parts() {
        let parts = vec![
            (2, Bytes::from_static(b"!!")),
            (0, Bytes::from_static(b"hello ")),
            (1, Bytes::from_static(b"world")),
        ];
        let payload = reassemble(parts, 13).unwrap();
        assert_eq!(&payload[..], b"hello world!!");
    }

    #[test]
    fn rejects_size_mismatch() {
        let parts = vec![(0, Bytes::from_static(b"short"))];
        assert!(matches!(
            reassemble(parts, 9),
            Err(Error::SizeMismatch {
                expected: 9,
                actual: 5
            })
        ));
    }

    #[test]
    fn verify_chunk_accepts_matching_bytes() {
        let data = b"chunk contents";
        let record = ChunkRecord {
            index: 0,
            service: Service::Pinata,
            cid: "bafy".into(),
            checksum: digest_hex(data),
            size: data.len() as u64,
        };
        verify_chunk(&record, data).unwrap();
    }

    #[test]
    fn verify_chunk_rejects_tampered_bytes() {
        let record = ChunkRecord {
            index: 3,
            service: Service::Pinata,
            cid: "bafy".into(),
            checksum: digest_hex(b"original"),
            size: 8,
        };
        let err = verify_chunk(&record, b"tampered").unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { index: 3, .. }));
    }
}
