use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of storage services this build knows how to talk to.
///
/// The manifest wire format stores the service as a string; the enum keeps
/// dispatch closed so an unknown name fails at parse time instead of at
/// lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Web3Storage,
    Pinata,
    NftStorage,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Web3Storage, Service::Pinata, Service::NftStorage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Web3Storage => "web3storage",
            Service::Pinata => "pinata",
            Service::NftStorage => "nftstorage",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown storage service: {0}")]
pub struct UnknownService(pub String);

impl FromStr for Service {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web3storage" => Ok(Service::Web3Storage),
            "pinata" => Ok(Service::Pinata),
            "nftstorage" => Ok(Service::NftStorage),
            other => Err(UnknownService(other.to_string())),
        }
    }
}
