//! End-to-end transfer tests against in-memory stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use strata_backend::{
    Error as BackendError, HttpError, ObjectStore, Registry, RetrievedObject, Service,
    StoredObject,
};
use strata_manifest::{EncryptionMeta, FileMeta, Manifest};
use strata_transfer::{
    Cipher, CipherError, Encrypted, Error, PartitionTable, TransferOptions, UploadProgress,
    download_sharded, fetch_manifest, upload_sharded,
};
use strata_verify::digest_hex;

type ObjectMap = Arc<Mutex<HashMap<String, Bytes>>>;

struct MemoryStore {
    service: Service,
    objects: ObjectMap,
    fail_puts: AtomicU32,
    put_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MemoryStore {
    fn new(service: Service) -> Self {
        Self {
            service,
            objects: Arc::default(),
            fail_puts: AtomicU32::new(0),
            put_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    fn failing_first(service: Service, failures: u32) -> Self {
        let store = Self::new(service);
        store.fail_puts.store(failures, Ordering::SeqCst);
        store
    }

    fn transient(&self) -> BackendError {
        BackendError::UploadFailed {
            service: self.service,
            attempts: 3,
            source: HttpError::Status(503),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn service(&self) -> Service {
        self.service
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn max_size(&self) -> u64 {
        u64::MAX
    }

    async fn put(&self, data: Bytes, _name: &str) -> strata_backend::Result<StoredObject> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(self.transient());
        }
        let cid = format!("{}-{}", self.service.as_str(), &digest_hex(&data)[..16]);
        let size = data.len() as u64;
        self.objects.lock().unwrap().insert(cid.clone(), data);
        Ok(StoredObject {
            url: format!("https://mock.example/{cid}"),
            cid,
            size,
            service: self.service,
        })
    }

    async fn get(&self, cid: &str) -> strata_backend::Result<RetrievedObject> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        match self.objects.lock().unwrap().get(cid) {
            Some(data) => Ok(RetrievedObject {
                bytes: data.clone(),
                size: data.len() as u64,
                cid: cid.to_string(),
            }),
            None => Err(BackendError::DownloadFailed {
                service: self.service,
                cid: cid.to_string(),
                routes: 1,
                source: HttpError::Status(404),
            }),
        }
    }

    async fn health(&self) -> bool {
        true
    }
}

fn registry() -> Registry<MemoryStore> {
    Registry::new(vec![
        MemoryStore::new(Service::Web3Storage),
        MemoryStore::new(Service::Pinata),
        MemoryStore::new(Service::NftStorage),
    ])
}

fn file_meta(name: &str, original_size: u64) -> FileMeta {
    FileMeta {
        file_name: name.into(),
        original_size,
    }
}

fn encryption_meta() -> EncryptionMeta {
    EncryptionMeta {
        key: "opaque-key".into(),
        iv: "opaque-iv".into(),
    }
}

fn patterned(len: usize) -> Bytes {
    Bytes::from((0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>())
}

#[tokio::test]
async fn small_payload_round_trip() {
    let registry = registry();
    let payload = patterned(1_000);
    let options = TransferOptions::default();

    let cid = upload_sharded(
        &registry,
        payload.clone(),
        file_meta("note.txt.enc", 1_000),
        encryption_meta(),
        &options,
        None,
    )
    .await
    .unwrap();

    let manifest = fetch_manifest(&registry, &cid).await.unwrap();
    assert_eq!(manifest.total_chunks, 1);
    assert_eq!(manifest.chunk_size, 10_240);
    // The single chunk lands on the first slot of the partition table.
    assert_eq!(manifest.chunks[0].service, Service::Web3Storage);

    let restored = download_sharded(&registry, &cid, &options, None)
        .await
        .unwrap();
    assert_eq!(restored, payload);
}

#[tokio::test]
async fn five_chunk_round_trip() {
    let registry = registry();
    let payload = patterned(4_500_000);
    let options = TransferOptions::default();

    let cid = upload_sharded(
        &registry,
        payload.clone(),
        file_meta("video.mp4.enc", 4_500_000),
        encryption_meta(),
        &options,
        None,
    )
    .await
    .unwrap();

    let manifest = fetch_manifest(&registry, &cid).await.unwrap();
    assert_eq!(manifest.total_chunks, 5);
    assert_eq!(manifest.chunk_size, 900_000);
    assert_eq!(manifest.original_size, 4_500_000);
    assert_eq!(manifest.stored_size(), 4_500_000);
    let services: Vec<Service> = manifest.chunks.iter().map(|c| c.service).collect();
    assert_eq!(
        services,
        vec![
            Service::Web3Storage,
            Service::Web3Storage,
            Service::Pinata,
            Service::NftStorage,
            Service::NftStorage,
        ]
    );

    let restored = download_sharded(&registry, &cid, &options, None)
        .await
        .unwrap();
    assert_eq!(restored, payload);
}

#[tokio::test]
async fn empty_payload_round_trip() {
    let registry = registry();
    let options = TransferOptions::default();

    let cid = upload_sharded(
        &registry,
        Bytes::new(),
        file_meta("empty.enc", 0),
        encryption_meta(),
        &options,
        None,
    )
    .await
    .unwrap();

    let manifest = fetch_manifest(&registry, &cid).await.unwrap();
    assert_eq!(manifest.total_chunks, 0);

    let restored = download_sharded(&registry, &cid, &options, None)
        .await
        .unwrap();
    assert!(restored.is_empty());
}

#[tokio::test]
async fn tampered_chunk_is_detected() {
    let registry = registry();
    let payload = patterned(1_000);
    let options = TransferOptions::default();

    let cid = upload_sharded(
        &registry,
        payload,
        file_meta("doc.enc", 1_000),
        encryption_meta(),
        &options,
        None,
    )
    .await
    .unwrap();

    // Corrupt the stored chunk without touching its manifest record.
    let manifest = fetch_manifest(&registry, &cid).await.unwrap();
    let record = &manifest.chunks[0];
    let store = registry.by_service(record.service).unwrap();
    {
        let mut objects = store.objects.lock().unwrap();
        let original = objects.get(&record.cid).unwrap().clone();
        let mut corrupted = original.to_vec();
        corrupted[0] ^= 0xff;
        objects.insert(record.cid.clone(), Bytes::from(corrupted));
    }

    let err = download_sharded(&registry, &cid, &options, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { index: 0, .. }));
}

#[tokio::test(start_paused = true)]
async fn upload_retries_transient_failures() {
    let registry = Registry::new(vec![
        MemoryStore::failing_first(Service::Web3Storage, 2),
        MemoryStore::new(Service::Pinata),
        MemoryStore::new(Service::NftStorage),
    ]);
    let payload = patterned(1_000);
    let options = TransferOptions::default();

    // Two failed attempts, then success on the third: clean result.
    let cid = upload_sharded(
        &registry,
        payload.clone(),
        file_meta("retry.enc", 1_000),
        encryption_meta(),
        &options,
        None,
    )
    .await
    .unwrap();

    let store = registry.by_service(Service::Web3Storage).unwrap();
    // 3 attempts for the chunk, plus 1 for the manifest on the primary.
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 4);

    let restored = download_sharded(&registry, &cid, &options, None)
        .await
        .unwrap();
    assert_eq!(restored, payload);
}

#[tokio::test(start_paused = true)]
async fn upload_aborts_when_retries_exhaust() {
    let registry = Registry::new(vec![
        MemoryStore::new(Service::Web3Storage),
        MemoryStore::failing_first(Service::Pinata, u32::MAX),
        MemoryStore::new(Service::NftStorage),
    ]);
    let payload = patterned(1_000);
    let options =
        TransferOptions::default().partition(PartitionTable::new(vec![Service::Pinata]).unwrap());

    let err = upload_sharded(
        &registry,
        payload,
        file_meta("doomed.enc", 1_000),
        encryption_meta(),
        &options,
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        Error::RetriesExhausted {
            index: 0,
            attempts: 3,
            ..
        }
    ));

    // No manifest may be published after a failed transfer.
    let primary = registry.by_service(Service::Web3Storage).unwrap();
    assert!(primary.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_manifest_rejected_before_any_chunk_download() {
    let registry = registry();
    let options = TransferOptions::default();

    // A manifest that claims two chunks but records only one.
    let json = format!(
        r#"{{"version":"1.0","totalChunks":2,"chunkSize":10240,"originalSize":100,
            "fileName":"bad.enc","encryptionKey":"k","encryptionIV":"iv",
            "chunks":[{{"index":0,"service":"pinata","cid":"bafy0","checksum":"{}","size":100}}]}}"#,
        "ab".repeat(32)
    );
    let store = registry.by_service(Service::Web3Storage).unwrap();
    store
        .objects
        .lock()
        .unwrap()
        .insert("bad-manifest".to_string(), Bytes::from(json));

    let err = download_sharded(&registry, "bad-manifest", &options, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Manifest(strata_manifest::Error::Invalid(_))
    ));

    // Only the manifest fetch itself touched a store.
    let gets: usize = [Service::Web3Storage, Service::Pinata, Service::NftStorage]
        .iter()
        .map(|s| {
            registry
                .by_service(*s)
                .unwrap()
                .get_calls
                .load(Ordering::SeqCst)
        })
        .sum();
    assert_eq!(gets, 1);
}

#[tokio::test]
async fn upload_progress_reports_every_chunk() {
    let registry = registry();
    let payload = patterned(4_500_000);
    let options = TransferOptions::default();

    let snapshots: Arc<Mutex<Vec<UploadProgress>>> = Arc::default();
    let sink = Arc::clone(&snapshots);
    upload_sharded(
        &registry,
        payload,
        file_meta("progress.enc", 4_500_000),
        encryption_meta(),
        &options,
        Some(Arc::new(move |p: &UploadProgress| {
            sink.lock().unwrap().push(p.clone());
        })),
    )
    .await
    .unwrap();

    let snapshots = snapshots.lock().unwrap();
    assert_eq!(snapshots.len(), 5);
    let last = snapshots.last().unwrap();
    assert_eq!(last.overall, 100.0);
    assert_eq!(last.uploaded, 5);
    assert_eq!(last.total, 5);
    assert_eq!(last.per_service_count[&Service::Web3Storage], 2);
    assert_eq!(last.per_service_count[&Service::Pinata], 1);
    assert_eq!(last.per_service_count[&Service::NftStorage], 2);
    assert_eq!(last.per_service_percent[&Service::Pinata], 100.0);
}

/// Toy reversible cipher standing in for the external collaborator.
struct XorCipher;

impl Cipher for XorCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Encrypted, CipherError> {
        let key = 0x5au8;
        Ok(Encrypted {
            ciphertext: Bytes::from(plaintext.iter().map(|b| b ^ key).collect::<Vec<u8>>()),
            key: format!("{key:02x}"),
            iv: "0".into(),
        })
    }

    fn decrypt(&self, ciphertext: &[u8], key: &str, _iv: &str) -> Result<Vec<u8>, CipherError> {
        let key = u8::from_str_radix(key, 16).map_err(|e| CipherError(e.to_string()))?;
        Ok(ciphertext.iter().map(|b| b ^ key).collect())
    }
}

#[tokio::test]
async fn cipher_material_travels_through_the_manifest() {
    let registry = registry();
    let options = TransferOptions::default();
    let plaintext = patterned(60_000);

    let cipher = XorCipher;
    let encrypted = cipher.encrypt(&plaintext).unwrap();
    let original_size = plaintext.len() as u64;

    let cid = upload_sharded(
        &registry,
        encrypted.ciphertext,
        file_meta("secret.bin", original_size),
        EncryptionMeta {
            key: encrypted.key,
            iv: encrypted.iv,
        },
        &options,
        None,
    )
    .await
    .unwrap();

    let manifest: Manifest = fetch_manifest(&registry, &cid).await.unwrap();
    let ciphertext = download_sharded(&registry, &cid, &options, None)
        .await
        .unwrap();
    let decrypted = cipher
        .decrypt(&ciphertext, &manifest.encryption_key, &manifest.encryption_iv)
        .unwrap();
    assert_eq!(decrypted, plaintext);
}
