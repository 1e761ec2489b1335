use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::receipt;

/// A stored receipt.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    /// Content-derived receipt id.
    #[schema(example = "or_2cf24dba5fb0")]
    pub id: String,
    /// Lowercase hex SHA-256 of the uploaded bytes.
    #[schema(example = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")]
    pub content_hash: String,
    /// When the content was first seen (UTC).
    pub created_at: DateTime<Utc>,
    /// Filename given on first upload.
    #[schema(example = "clip.mp4")]
    pub filename: Option<String>,
    /// Content type given on first upload.
    #[schema(example = "video/mp4")]
    pub mime: Option<String>,
    #[schema(example = 5)]
    pub size_bytes: i64,
}

/// Response to a successful upload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct IssuedReceiptResponse {
    pub receipt: ReceiptResponse,
    /// Path of the public verification page.
    #[schema(example = "/r/or_2cf24dba5fb0")]
    pub url: String,
}

/// Path of the public verification page for a receipt.
pub fn receipt_page_url(id: &str) -> String {
    format!("/r/{id}")
}

impl From<receipt::Model> for ReceiptResponse {
    fn from(model: receipt::Model) -> Self {
        Self {
            id: model.id,
            content_hash: model.content_hash,
            created_at: model.created_at,
            filename: model.filename,
            mime: model.mime,
            size_bytes: model.size_bytes.unwrap_or(0),
        }
    }
}

impl From<receipt::Model> for IssuedReceiptResponse {
    fn from(model: receipt::Model) -> Self {
        let url = receipt_page_url(&model.id);
        Self {
            receipt: model.into(),
            url,
        }
    }
}
