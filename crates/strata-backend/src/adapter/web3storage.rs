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
    cid: String,
}

/// web3.storage: bearer-token upload API, IPFS gateway retrieval.
pub struct Web3StorageAdapter<C> {
    config: BackendConfig,
    client: Arc<C>,
}

impl<C> Web3StorageAdapter<C> {
    pub fn new(config: BackendConfig, client: Arc<C>) -> Self {
        Self { config, client }
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl<C: HttpClient> ObjectStore for Web3StorageAdapter<C> {
    fn service(&self) -> Service {
        Service::Web3Storage
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
                    debug!(cid = %parsed.cid, size, "stored object on web3.storage");
                    return Ok(StoredObject {
                        url: object_url(&self.config.gateways, &parsed.cid),
                        cid: parsed.cid,
                        size,
                        service: self.service(),
                    });
                }
                Ok(response) => last = HttpError::Status(response.status),
                Err(e) => last = e,
            }
            warn!(attempt, error = %last, "web3.storage upload attempt failed");
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
