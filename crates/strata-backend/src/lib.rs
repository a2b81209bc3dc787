//! Storage backend adapters and registry for sharded uploads.
//!
//! Each supported service is wrapped behind the [`ObjectStore`] capability
//! contract (upload, download, health, configuration state). The
//! [`Registry`] holds the fixed adapter set, designates the primary backend
//! for manifest storage, and provides whole-object upload/download with
//! sequential fallback across services.
//!
//! Adapters apply their own bounded upload retry and try several public
//! gateway mirrors on retrieval; anything that still fails is surfaced as a
//! typed error carrying the backend identity and last underlying cause.

pub use self::adapter::{Backend, NftStorageAdapter, PinataAdapter, Web3StorageAdapter};
pub use self::config::{BackendConfig, RegistryConfig};
pub use self::error::{Error, FailedAttempts, Result};
pub use self::http::{HttpClient, HttpError, HttpResponse, ReqwestClient};
pub use self::registry::Registry;
pub use self::service::{Service, UnknownService};
pub use self::store::{ObjectStore, RetrievedObject, StoredObject};

mod adapter;
mod config;
mod error;
mod http;
mod registry;
mod service;
mod store;
