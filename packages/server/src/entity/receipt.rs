use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One receipt per distinct content hash. Rows are never updated or deleted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    /// `or_` + first 12 hex characters of `content_hash`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Full lowercase hex SHA-256 of the uploaded bytes.
    pub content_hash: String,

    pub created_at: DateTimeUtc,

    /// Advisory; not part of the receipt's identity.
    pub filename: Option<String>,
    /// Advisory; not part of the receipt's identity.
    pub mime: Option<String>,

    pub size_bytes: Option<i64>,
}

impl ActiveModelBehavior for ActiveModel {}
