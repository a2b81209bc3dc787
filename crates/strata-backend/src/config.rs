use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::service::Service;

const MIB: u64 = 1024 * 1024;

/// Connection settings for one storage service.
///
/// The library never reads ambient state; construct these explicitly (or
/// via [`RegistryConfig::from_env`] in binaries) and hand them to the
/// adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API credential. `None` leaves the backend unconfigured: uploads are
    /// refused locally, public retrieval still works.
    #[serde(default)]
    pub token: Option<String>,
    /// Base URL of the service's upload API.
    pub endpoint: String,
    /// Public gateway mirrors tried in order during retrieval.
    pub gateways: Vec<String>,
    /// Free-tier object size limit, in bytes.
    pub max_size: u64,
    /// Per-attempt network timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl BackendConfig {
    /// Stock endpoints, mirrors and free-tier limits for a service.
    pub fn defaults_for(service: Service) -> Self {
        match service {
            Service::Web3Storage => Self {
                token: None,
                endpoint: "https://api.web3.storage".into(),
                gateways: vec![
                    "https://w3s.link/ipfs".into(),
                    "https://ipfs.io/ipfs".into(),
                    "https://dweb.link/ipfs".into(),
                ],
                max_size: 100 * MIB,
                timeout_secs: default_timeout_secs(),
            },
            Service::Pinata => Self {
                token: None,
                endpoint: "https://api.pinata.cloud".into(),
                gateways: vec![
                    "https://gateway.pinata.cloud/ipfs".into(),
                    "https://ipfs.io/ipfs".into(),
                    "https://dweb.link/ipfs".into(),
                ],
                max_size: 25 * MIB,
                timeout_secs: default_timeout_secs(),
            },
            Service::NftStorage => Self {
                token: None,
                endpoint: "https://api.nft.storage".into(),
                gateways: vec![
                    "https://nftstorage.link/ipfs".into(),
                    "https://ipfs.io/ipfs".into(),
                    "https://dweb.link/ipfs".into(),
                ],
                max_size: 100 * MIB,
                timeout_secs: default_timeout_secs(),
            },
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for the whole backend set, in registration order.
/// Sections omitted from a config file fall back to the service defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_web3storage")]
    pub web3storage: BackendConfig,
    #[serde(default = "default_pinata")]
    pub pinata: BackendConfig,
    #[serde(default = "default_nftstorage")]
    pub nftstorage: BackendConfig,
}

fn default_web3storage() -> BackendConfig {
    BackendConfig::defaults_for(Service::Web3Storage)
}

fn default_pinata() -> BackendConfig {
    BackendConfig::defaults_for(Service::Pinata)
}

fn default_nftstorage() -> BackendConfig {
    BackendConfig::defaults_for(Service::NftStorage)
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            web3storage: BackendConfig::defaults_for(Service::Web3Storage),
            pinata: BackendConfig::defaults_for(Service::Pinata),
            nftstorage: BackendConfig::defaults_for(Service::NftStorage),
        }
    }
}

impl RegistryConfig {
    pub fn for_service(&self, service: Service) -> &BackendConfig {
        match service {
            Service::Web3Storage => &self.web3storage,
            Service::Pinata => &self.pinata,
            Service::NftStorage => &self.nftstorage,
        }
    }

    pub fn for_service_mut(&mut self, service: Service) -> &mut BackendConfig {
        match service {
            Service::Web3Storage => &mut self.web3storage,
            Service::Pinata => &mut self.pinata,
            Service::NftStorage => &mut self.nftstorage,
        }
    }

    /// Overlay `STRATA_<SERVICE>_TOKEN` environment variables onto this
    /// config. Environment wins over whatever is already set.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        for service in Service::ALL {
            let var = format!("STRATA_{}_TOKEN", service.as_str().to_ascii_uppercase());
            if let Ok(token) = std::env::var(&var) {
                if !token.is_empty() {
                    self.for_service_mut(service).token = Some(token);
                }
            }
        }
        self
    }
}
