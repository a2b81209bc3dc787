//! Chunk integrity primitives for sharded transfers.
//!
//! Every chunk that crosses a backend boundary carries a SHA-256 hex
//! checksum in the manifest. This crate provides the incremental hasher
//! used while bytes stream through, the one-shot digest used when a chunk
//! is already in memory, and the comparison that turns a stored checksum
//! into a pass/fail verdict.

pub use self::error::{Result, VerifyError};
pub use self::hasher::{Hasher, Sha256Hasher, digest_hex, verify_hex};

mod error;
mod hasher;
