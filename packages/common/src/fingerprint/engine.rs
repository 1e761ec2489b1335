use std::io::Read;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::error::FingerprintError;
use super::hash::ContentHash;
use super::id::ReceiptId;

const READ_BUF_SIZE: usize = 64 * 1024;

/// The identity of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    pub content_hash: ContentHash,
    pub id: ReceiptId,
    pub size_bytes: u64,
}

impl Fingerprint {
    /// Fingerprint an in-memory byte slice. Empty input is valid.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = FingerprintHasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Fingerprint everything a reader yields until EOF.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, FingerprintError> {
        let mut hasher = FingerprintHasher::new();
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FingerprintError::InvalidInput(e)),
            };
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize())
    }
}

/// Incremental fingerprinting for content that arrives in chunks.
///
/// Feeding chunks `a`, `b` yields the same fingerprint as
/// `Fingerprint::compute(a ++ b)`.
#[derive(Clone, Default)]
pub struct FingerprintHasher {
    digest: Sha256,
    size_bytes: u64,
}

impl FingerprintHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.digest.update(chunk);
        self.size_bytes += chunk.len() as u64;
    }

    /// Bytes fed so far.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn finalize(self) -> Fingerprint {
        let content_hash = ContentHash::from_bytes(self.digest.finalize().into());
        Fingerprint {
            id: ReceiptId::from_hash(&content_hash),
            content_hash,
            size_bytes: self.size_bytes,
        }
    }
}
