use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::adapter::Backend;
use crate::config::RegistryConfig;
use crate::error::{Error, FailedAttempts, Result};
use crate::http::HttpClient;
use crate::service::Service;
use crate::store::{ObjectStore, RetrievedObject, StoredObject};

/// The fixed, ordered set of backends one operation works against.
///
/// Explicitly constructed and passed by reference wherever it is needed;
/// there is no process-wide instance, so independent operations (and tests)
/// can run against registries with different configurations.
pub struct Registry<S> {
    stores: Vec<S>,
}

impl<S: ObjectStore> Registry<S> {
    /// Build a registry from adapters in registration order. The first
    /// configured adapter becomes the primary.
    pub fn new(stores: Vec<S>) -> Self {
        Self { stores }
    }

    pub fn stores(&self) -> &[S] {
        &self.stores
    }

    pub fn by_service(&self, service: Service) -> Option<&S> {
        self.stores.iter().find(|s| s.service() == service)
    }

    /// The designated backend for manifest storage: the first configured
    /// adapter in registration order.
    pub fn primary(&self) -> Result<&S> {
        self.stores
            .iter()
            .find(|s| s.is_configured())
            .ok_or(Error::NoBackendsConfigured)
    }

    pub fn configured(&self) -> impl Iterator<Item = &S> {
        self.stores.iter().filter(|s| s.is_configured())
    }

    /// Upload through configured adapters in order, returning the first
    /// success. The aggregate error keeps every attempted backend's last
    /// failure.
    pub async fn upload_with_fallback(&self, data: Bytes, name: &str) -> Result<StoredObject> {
        if self.configured().next().is_none() {
            return Err(Error::NoBackendsConfigured);
        }
        let mut attempts = Vec::new();
        for store in self.configured() {
            match store.put(data.clone(), name).await {
                Ok(stored) => {
                    debug!(service = %stored.service, cid = %stored.cid, "fallback upload succeeded");
                    return Ok(stored);
                }
                Err(e) => {
                    warn!(service = %store.service(), error = %e, "fallback upload attempt failed");
                    attempts.push((store.service(), e.to_string()));
                }
            }
        }
        Err(Error::AllBackendsFailed {
            op: "upload",
            attempts: FailedAttempts(attempts),
        })
    }

    /// Download by cid, trying every adapter, configured or not, since
    /// public retrieval does not require the caller's own credentials.
    pub async fn download_with_fallback(&self, cid: &str) -> Result<RetrievedObject> {
        let mut attempts = Vec::new();
        for store in &self.stores {
            match store.get(cid).await {
                Ok(object) => return Ok(object),
                Err(e) => {
                    warn!(service = %store.service(), error = %e, "fallback download attempt failed");
                    attempts.push((store.service(), e.to_string()));
                }
            }
        }
        Err(Error::AllBackendsFailed {
            op: "download",
            attempts: FailedAttempts(attempts),
        })
    }

    /// Probe every adapter concurrently.
    pub async fn health_check_all(&self) -> HashMap<Service, bool> {
        let probes = self
            .stores
            .iter()
            .map(|s| async { (s.service(), s.health().await) });
        join_all(probes).await.into_iter().collect()
    }
}

impl<C: HttpClient> Registry<Backend<C>> {
    /// Production registry: the three known services in their fixed
    /// registration order, sharing one HTTP client.
    pub fn from_config(config: RegistryConfig, client: Arc<C>) -> Self {
        let stores = Service::ALL
            .into_iter()
            .map(|service| {
                Backend::from_config(
                    service,
                    config.for_service(service).clone(),
                    Arc::clone(&client),
                )
            })
            .collect();
        Self::new(stores)
    }
}
