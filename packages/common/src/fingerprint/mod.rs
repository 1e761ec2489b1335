//! Content fingerprinting.
//!
//! A [`Fingerprint`] is a pure function of a byte sequence: the SHA-256 digest
//! of the bytes, the receipt id derived from that digest, and the byte length.
//! Filename, MIME type, upload time and client never influence it.

mod engine;
mod error;
mod hash;
mod id;

pub use engine::{Fingerprint, FingerprintHasher};
pub use error::FingerprintError;
pub use hash::ContentHash;
pub use id::ReceiptId;
