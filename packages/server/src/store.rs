//! Durable, content-addressed receipt storage.
//!
//! Every write goes through a single `INSERT ... ON CONFLICT (id) DO NOTHING`,
//! which is the only serialization point between concurrent uploads of the
//! same content. The row that wins is then re-read, so every caller observes
//! the original `created_at` and metadata.

use chrono::Utc;
use common::{ContentHash, Fingerprint, ReceiptId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::entity::receipt;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be reached, or a read or write failed.
    #[error("{0}")]
    Unavailable(#[from] DbErr),

    /// The id is already held by a receipt for different content.
    #[error("receipt {id} already exists for content {existing_hash}")]
    IdCollision { id: String, existing_hash: String },

    /// The content is larger than the size column can record.
    #[error("content size {0} bytes does not fit the size column")]
    SizeOutOfRange(u64),

    /// The row was not visible right after the insert attempt.
    #[error("receipt {0} missing after insert")]
    Vanished(String),
}

/// Advisory metadata recorded alongside a new receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptMetadata {
    pub filename: Option<String>,
    pub mime: Option<String>,
}

#[derive(Clone)]
pub struct ReceiptStore {
    db: DatabaseConnection,
}

impl ReceiptStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Return the receipt for `fingerprint`, creating it if this content has
    /// never been seen.
    ///
    /// On conflict the stored row wins and `metadata` is discarded.
    #[instrument(skip(self, fingerprint, metadata), fields(id = %fingerprint.id))]
    pub async fn create_or_get(
        &self,
        fingerprint: &Fingerprint,
        metadata: ReceiptMetadata,
    ) -> Result<receipt::Model, StoreError> {
        let id = fingerprint.id.to_string();
        let content_hash = fingerprint.content_hash.to_hex();
        let size_bytes = i64::try_from(fingerprint.size_bytes)
            .map_err(|_| StoreError::SizeOutOfRange(fingerprint.size_bytes))?;

        let model = receipt::ActiveModel {
            id: Set(id.clone()),
            content_hash: Set(content_hash),
            created_at: Set(Utc::now()),
            filename: Set(metadata.filename),
            mime: Set(metadata.mime),
            size_bytes: Set(Some(size_bytes)),
        };

        let inserted = receipt::Entity::insert(model)
            .on_conflict(
                OnConflict::column(receipt::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;
        let created = match inserted {
            Ok(rows) => rows > 0,
            Err(DbErr::RecordNotInserted) => false,
            Err(e) => return Err(e.into()),
        };

        let stored = receipt::Entity::find_by_id(id.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::Vanished(id.clone()))?;

        // A stored hash that does not parse cannot be this content either.
        let stored_hash = ContentHash::from_hex(&stored.content_hash).ok();
        if stored_hash != Some(fingerprint.content_hash) {
            warn!(
                existing_hash = %stored.content_hash,
                incoming_hash = %fingerprint.content_hash,
                "Receipt id collision between distinct contents"
            );
            return Err(StoreError::IdCollision {
                id,
                existing_hash: stored.content_hash,
            });
        }

        if created {
            info!(size_bytes = fingerprint.size_bytes, "Issued new receipt");
        } else {
            debug!("Receipt already existed");
        }

        Ok(stored)
    }

    /// Exact-match lookup. `Ok(None)` means no such receipt.
    ///
    /// Ids that could never have been issued are answered without a query.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<receipt::Model>, StoreError> {
        if ReceiptId::parse(id).is_none() {
            debug!("Malformed receipt id");
            return Ok(None);
        }

        Ok(receipt::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?)
    }

    /// Round trip to the database.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await?;
        Ok(())
    }
}
