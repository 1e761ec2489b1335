pub mod fingerprint;

pub use fingerprint::{ContentHash, Fingerprint, FingerprintError, FingerprintHasher, ReceiptId};
