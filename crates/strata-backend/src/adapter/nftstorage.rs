use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpError};
use crate::service::Service;
use crate::store::{ObjectStore, RetrievedObject, StoredObject};

use super::{NAME_HEADER, UPLOAD_ATTEMPTS, gateway_get, object_url, probe, retry_delay};

#[derive(Deserialize)]
struct UploadResponse {
    value: UploadValue,
}

#[derive(Deserialize)]
struct UploadValue {
    cid: String,
}

/// nft.storage: bearer-token upload API with an enveloped JSON response.
pub struct NftStorageAdapter<C> {
    config: BackendConfig,
    client: Arc<C>,
}

impl<C> NftStorageAdapter<C> {
    pub fn new(config: BackendConfig, client: Arc<C>) -> Self {
        Self { config, client }
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl<C: HttpClient> ObjectStore for NftStorageAdapter<C> {
    fn service(&self) -> Service {
        Service::NftStorage
    }

    fn is_configured(&self) -> bool {
        self.config.token.is_some()
    }

    fn max_size(&self) -> u64 {
        self.config.max_size
    }

    async fn put(&self, data: Bytes, name: &str) -> Result<StoredObject> {
        let Some(token) = &self.config.token else {
            return Err(Error::NotConfigured {
                service: self.service(),
            });
        };
        let size = data.len() as u64;
        if size > self.config.max_size {
            return Err(Error::SizeExceeded {
                service: self.service(),
                size,
                max: self.config.max_size,
            });
        }

        let url = self.upload_url();
        let headers = vec![
            ("authorization".to_string(), format!("Bearer {token}")),
            (NAME_HEADER.to_string(), name.to_string()),
        ];

        let mut last = HttpError::Transport("no attempt made".into());
        for attempt in 1..=UPLOAD_ATTEMPTS {
            match self
                .client
                .post(&url, &headers, data.clone(), self.config.timeout())
                .await
            {
                Ok(response) if response.is_success() => {
                    let parsed: UploadResponse =
                        serde_json::from_slice(&response.body).map_err(|e| Error::BadResponse {
                            service: self.service(),
                            reason: e.to_string(),
                        })?;
                    debug!(cid = %parsed.value.cid, size, "stored object on nft.storage");
                    return Ok(StoredObject {
                        url: object_url(&self.config.gateways, &parsed.value.cid),
                        cid: parsed.value.cid,
                        size,
                        service: self.service(),
                    });
                }
                Ok(response) => last = HttpError::Status(response.status),
                Err(e) => last = e,
            }
            warn!(attempt, error = %last, "nft.storage upload attempt failed");
            if attempt < UPLOAD_ATTEMPTS {
                tokio::time::sleep(retry_delay(attempt)).await;
            }
        }
        Err(Error::UploadFailed {
            service: self.service(),
            attempts: UPLOAD_ATTEMPTS,
            source: last,
        })
    }

    async fn get(&self, cid: &str) -> Result<RetrievedObject> {
        gateway_get(
            self.client.as_ref(),
            self.service(),
            &self.config.gateways,
            cid,
            self.config.timeout(),
        )
        .await
    }

    async fn health(&self) -> bool {
        probe(
            self.client.as_ref(),
            &self.config.endpoint,
            self.config.timeout(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::mock::MockClient;

    #[tokio::test]
    async fn put_unwraps_response_envelope() {
        let client = Arc::new(MockClient::new());
        client.push_ok(200, r#"{"ok":true,"value":{"cid":"bafynft"}}"#);
        let config = BackendConfig::defaults_for(Service::NftStorage).with_token("tok");
        let adapter = NftStorageAdapter::new(config, Arc::clone(&client));

        let stored = adapter.put(Bytes::from_static(b"data"), "f").await.unwrap();
        assert_eq!(stored.cid, "bafynft");
        assert_eq!(stored.service, Service::NftStorage);
    }

    #[tokio::test(start_paused = true)]
    async fn put_gives_up_after_three_attempts() {
        let client = Arc::new(MockClient::new());
        for _ in 0..3 {
            client.push_err(HttpError::Transport("reset".into()));
        }
        let config = BackendConfig::defaults_for(Service::NftStorage).with_token("tok");
        let adapter = NftStorageAdapter::new(config, Arc::clone(&client));

        let err = adapter.put(Bytes::from_static(b"data"), "f").await.unwrap_err();
        assert!(matches!(err, Error::UploadFailed { attempts: 3, .. }));
        assert_eq!(client.call_count(), 3);
    }
}
