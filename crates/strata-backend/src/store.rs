use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::service::Service;

/// Metadata returned after a successful upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Backend-issued content identifier. Opaque; equal inputs are not
    /// guaranteed to produce equal identifiers across services.
    pub cid: String,
    /// A retrieval URL for the object, typically through the first gateway.
    pub url: String,
    pub size: u64,
    pub service: Service,
}

/// A downloaded object together with the identifier it was fetched under.
#[derive(Debug, Clone)]
pub struct RetrievedObject {
    pub bytes: Bytes,
    pub size: u64,
    pub cid: String,
}

/// Capability contract every storage backend satisfies.
///
/// Adapters are stateless after construction and safe to share across
/// concurrent operations. All data handed to a store is already encrypted;
/// backends never see plaintext.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn service(&self) -> Service;

    /// True iff required credentials and endpoints are present. Checked
    /// before any network call; `put` on an unconfigured store fails with
    /// `NotConfigured` without touching the network.
    fn is_configured(&self) -> bool;

    /// Largest object this service accepts, in bytes.
    fn max_size(&self) -> u64;

    /// Upload one object. Applies the adapter's own bounded retry before
    /// surfacing `UploadFailed`; a success means an object addressable by
    /// the returned cid exists at the service.
    async fn put(&self, data: Bytes, name: &str) -> Result<StoredObject>;

    /// Download one object by cid, trying every configured retrieval route
    /// before surfacing `DownloadFailed`. Retrieval is public and does not
    /// require credentials.
    async fn get(&self, cid: &str) -> Result<RetrievedObject>;

    /// Best-effort reachability probe. Never errors; any failure is `false`.
    async fn health(&self) -> bool;
}
