use std::fmt;

use serde::{Deserialize, Serialize};

use super::hash::ContentHash;

/// Short, shareable identifier of a receipt.
///
/// Always `or_` followed by the first 12 lowercase hex characters of the
/// content hash. Truncation means two different contents can in principle map
/// to the same id; callers that store receipts must check the full hash.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReceiptId(String);

impl ReceiptId {
    pub const PREFIX: &'static str = "or_";
    /// Number of hex characters of the content hash kept in the id.
    pub const HASH_CHARS: usize = 12;

    /// Derive the id for a content hash.
    pub fn from_hash(hash: &ContentHash) -> Self {
        let hex = hash.to_hex();
        Self(format!("{}{}", Self::PREFIX, &hex[..Self::HASH_CHARS]))
    }

    /// Accept only the canonical shape: `or_` plus 12 lowercase hex digits.
    ///
    /// No trimming or case folding is applied.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(Self::PREFIX)?;
        let canonical = digits.len() == Self::HASH_CHARS
            && digits
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        canonical.then(|| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiptId({})", self.0)
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReceiptId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ReceiptId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("malformed receipt id: {s}")))
    }
}
