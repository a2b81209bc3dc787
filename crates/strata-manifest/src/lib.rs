//! The chunk-map manifest: the single record describing how to reverse a
//! sharded upload, and the only handle a caller needs to reconstruct the
//! original data.
//!
//! A manifest is created once, atomically, through [`ManifestBuilder`],
//! which refuses to produce one until every chunk slot holds a resolvable
//! record, and is immutable thereafter. Whichever backend stores the
//! serialized record owns it; there is no separate manifest database.

pub use self::builder::{EncryptionMeta, FileMeta, ManifestBuilder};
pub use self::error::{Error, Result};
pub use self::record::{ChunkRecord, MANIFEST_VERSION, Manifest};

mod builder;
mod error;
mod record;
