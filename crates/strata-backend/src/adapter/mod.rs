//! Concrete storage adapters.
//!
//! One adapter per service, all satisfying [`ObjectStore`], wrapped in the
//! closed [`Backend`] enum so the rest of the system dispatches over a
//! known set of variants instead of strings.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpError};
use crate::service::Service;
use crate::store::{ObjectStore, RetrievedObject, StoredObject};

pub use self::nftstorage::NftStorageAdapter;
pub use self::pinata::PinataAdapter;
pub use self::web3storage::Web3StorageAdapter;

mod nftstorage;
mod pinata;
mod web3storage;

/// Upload attempts an adapter makes on its own before surfacing failure.
pub(crate) const UPLOAD_ATTEMPTS: u32 = 3;

/// Header carrying the caller-supplied object name on upload.
pub(crate) const NAME_HEADER: &str = "x-object-name";

/// Delay before retrying a failed upload attempt: `1s * 2^(attempt-1)`,
/// with `attempt` 1-based. Saturates instead of overflowing.
pub(crate) fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(1).saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Fetch `cid` through the gateway mirror list, in order. All routes
/// exhausted is the only failure reported upward.
pub(crate) async fn gateway_get<C: HttpClient>(
    client: &C,
    service: Service,
    gateways: &[String],
    cid: &str,
    timeout: Duration,
) -> Result<RetrievedObject> {
    let mut last: Option<HttpError> = None;
    for gateway in gateways {
        let url = format!("{}/{}", gateway.trim_end_matches('/'), cid);
        match client.get(&url, &[], timeout).await {
            Ok(response) if response.is_success() => {
                let size = response.body.len() as u64;
                return Ok(RetrievedObject {
                    bytes: response.body,
                    size,
                    cid: cid.to_string(),
                });
            }
            Ok(response) => {
                warn!(%service, gateway, status = response.status, "gateway miss");
                last = Some(HttpError::Status(response.status));
            }
            Err(e) => {
                warn!(%service, gateway, error = %e, "gateway unreachable");
                last = Some(e);
            }
        }
    }
    Err(Error::DownloadFailed {
        service,
        cid: cid.to_string(),
        routes: gateways.len(),
        source: last.unwrap_or_else(|| HttpError::Transport("no gateways configured".into())),
    })
}

/// Retrieval URL for a stored object through the first gateway, or the
/// bare cid when no gateway is configured.
pub(crate) fn object_url(gateways: &[String], cid: &str) -> String {
    match gateways.first() {
        Some(gateway) => format!("{}/{}", gateway.trim_end_matches('/'), cid),
        None => cid.to_string(),
    }
}

/// Reachability probe: any response below 500 counts as alive.
pub(crate) async fn probe<C: HttpClient>(client: &C, url: &str, timeout: Duration) -> bool {
    matches!(client.get(url, &[], timeout).await, Ok(response) if response.status < 500)
}

/// The closed set of backends this build ships.
pub enum Backend<C> {
    Web3Storage(Web3StorageAdapter<C>),
    Pinata(PinataAdapter<C>),
    NftStorage(NftStorageAdapter<C>),
}

impl<C: HttpClient> Backend<C> {
    pub fn from_config(service: Service, config: BackendConfig, client: Arc<C>) -> Self {
        match service {
            Service::Web3Storage => Backend::Web3Storage(Web3StorageAdapter::new(config, client)),
            Service::Pinata => Backend::Pinata(PinataAdapter::new(config, client)),
            Service::NftStorage => Backend::NftStorage(NftStorageAdapter::new(config, client)),
        }
    }
}

#[async_trait]
impl<C: HttpClient> ObjectStore for Backend<C> {
    fn service(&self) -> Service {
        match self {
            Backend::Web3Storage(a) => a.service(),
            Backend::Pinata(a) => a.service(),
            Backend::NftStorage(a) => a.service(),
        }
    }

    fn is_configured(&self) -> bool {
        match self {
            Backend::Web3Storage(a) => a.is_configured(),
            Backend::Pinata(a) => a.is_configured(),
            Backend::NftStorage(a) => a.is_configured(),
        }
    }

    fn max_size(&self) -> u64 {
        match self {
            Backend::Web3Storage(a) => a.max_size(),
            Backend::Pinata(a) => a.max_size(),
            Backend::NftStorage(a) => a.max_size(),
        }
    }

    async fn put(&self, data: Bytes, name: &str) -> Result<StoredObject> {
        match self {
            Backend::Web3Storage(a) => a.put(data, name).await,
            Backend::Pinata(a) => a.put(data, name).await,
            Backend::NftStorage(a) => a.put(data, name).await,
        }
    }

    async fn get(&self, cid: &str) -> Result<RetrievedObject> {
        match self {
            Backend::Web3Storage(a) => a.get(cid).await,
            Backend::Pinata(a) => a.get(cid).await,
            Backend::NftStorage(a) => a.get(cid).await,
        }
    }

    async fn health(&self) -> bool {
        match self {
            Backend::Web3Storage(a) => a.health().await,
            Backend::Pinata(a) => a.health().await,
            Backend::NftStorage(a) => a.health().await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_doubles_per_attempt() {
        assert_eq!(retry_delay(1), Duration::from_secs(1));
        assert_eq!(retry_delay(2), Duration::from_secs(2));
        assert_eq!(retry_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn retry_delay_saturates() {
        // Large attempt numbers must not panic.
        let _ = retry_delay(u32::MAX);
    }

    #[tokio::test]
    async fn gateway_get_falls_through_mirrors() {
        let client = mock::MockClient::new();
        client.push_err(HttpError::Transport("refused".into()));
        client.push_ok(404, "");
        client.push_ok(200, "payload");

        let gateways = vec![
            "https://a.example/ipfs".to_string(),
            "https://b.example/ipfs".to_string(),
            "https://c.example/ipfs".to_string(),
        ];
        let got = gateway_get(&client, Service::Pinata, &gateways, "bafytest", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(&got.bytes[..], b"payload");
        assert_eq!(got.size, 7);
        assert_eq!(client.call_count(), 3);
        assert_eq!(
            client.calls.lock().unwrap()[2],
            "https://c.example/ipfs/bafytest"
        );
    }

    #[tokio::test]
    async fn gateway_get_reports_exhaustion() {
        let client = mock::MockClient::new();
        client.push_ok(500, "");
        client.push_ok(502, "");

        let gateways = vec![
            "https://a.example/ipfs".to_string(),
            "https://b.example/ipfs".to_string(),
        ];
        let err = gateway_get(&client, Service::Web3Storage, &gateways, "bafyx", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            Error::DownloadFailed { routes, source, .. } => {
                assert_eq!(routes, 2);
                assert!(matches!(source, HttpError::Status(502)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
