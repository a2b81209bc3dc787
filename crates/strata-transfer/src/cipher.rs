use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
#[error("cipher failure: {0}")]
pub struct CipherError(pub String);

/// Output of the encryption collaborator: the ciphertext this layer
/// shards, plus the opaque key material recorded in the manifest.
pub struct Encrypted {
    pub ciphertext: Bytes,
    pub key: String,
    pub iv: String,
}

/// Client-side encryption boundary.
///
/// This layer never encrypts or decrypts anything itself; it stores
/// ciphertext and carries `key`/`iv` through the manifest untouched.
/// Callers bring their own implementation and apply it on either side of
/// the transfer.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Encrypted, CipherError>;
    fn decrypt(&self, ciphertext: &[u8], key: &str, iv: &str) -> Result<Vec<u8>, CipherError>;
}
