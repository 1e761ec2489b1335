use chrono::{TimeZone, Utc};
use common::Fingerprint;
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use receipt_server::entity::receipt;
use receipt_server::store::{ReceiptMetadata, StoreError};

use crate::common::TestDb;

fn metadata(filename: &str, mime: &str) -> ReceiptMetadata {
    ReceiptMetadata {
        filename: Some(filename.to_string()),
        mime: Some(mime.to_string()),
    }
}

#[tokio::test]
async fn create_or_get_is_idempotent() {
    let db = TestDb::new().await;
    let store = db.store();
    let fp = Fingerprint::compute(b"idempotent");

    let first = store
        .create_or_get(&fp, metadata("a.txt", "text/plain"))
        .await
        .unwrap();
    let second = store
        .create_or_get(&fp, metadata("b.png", "image/png"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.id, fp.id.as_str());
    assert_eq!(first.content_hash, fp.content_hash.to_hex());
    assert_eq!(second.filename.as_deref(), Some("a.txt"));
    assert_eq!(second.mime.as_deref(), Some("text/plain"));
    assert_eq!(second.size_bytes, Some(10));
    assert_eq!(db.receipt_count().await, 1);
}

#[tokio::test]
async fn metadata_is_optional() {
    let db = TestDb::new().await;
    let fp = Fingerprint::compute(b"anonymous");

    let stored = db
        .store()
        .create_or_get(&fp, ReceiptMetadata::default())
        .await
        .unwrap();

    assert_eq!(stored.filename, None);
    assert_eq!(stored.mime, None);
}

#[tokio::test]
async fn get_by_id_returns_stored_row() {
    let db = TestDb::new().await;
    let store = db.store();
    let fp = Fingerprint::compute(b"lookup");
    let created = store
        .create_or_get(&fp, ReceiptMetadata::default())
        .await
        .unwrap();

    let found = store.get_by_id(fp.id.as_str()).await.unwrap();

    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn get_by_id_miss_is_none_not_error() {
    let db = TestDb::new().await;
    let store = db.store();

    assert_eq!(store.get_by_id("or_000000000000").await.unwrap(), None);
    assert_eq!(store.get_by_id("or_doesnotexist").await.unwrap(), None);
    assert_eq!(store.get_by_id("").await.unwrap(), None);
    assert_eq!(store.get_by_id("'; DROP TABLE receipts; --").await.unwrap(), None);
    assert_eq!(db.receipt_count().await, 0);
}

#[tokio::test]
async fn concurrent_uploads_store_one_row() {
    let db = TestDb::new().await;
    let fp = Fingerprint::compute(b"racing uploads");

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = db.store();
            let fp = fp.clone();
            let meta = metadata(&format!("copy-{i}.bin"), "application/octet-stream");
            tokio::spawn(async move { store.create_or_get(&fp, meta).await })
        })
        .collect();

    let results: Vec<receipt::Model> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked").expect("create_or_get failed"))
        .collect();

    assert_eq!(db.receipt_count().await, 1);
    let canonical = db.store().get_by_id(fp.id.as_str()).await.unwrap().unwrap();
    for r in &results {
        assert_eq!(r, &canonical);
    }
}

#[tokio::test]
async fn id_collision_is_detected_and_row_kept() {
    let db = TestDb::new().await;
    let fp = Fingerprint::compute(b"newcomer");

    // A different content that happens to own the same truncated id.
    let squatter = receipt::ActiveModel {
        id: Set(fp.id.to_string()),
        content_hash: Set(format!("{}{}", &fp.content_hash.to_hex()[..12], "0".repeat(52))),
        created_at: Set(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        filename: Set(Some("squatter.bin".into())),
        mime: Set(None),
        size_bytes: Set(Some(1)),
    };
    receipt::Entity::insert(squatter)
        .exec_without_returning(&db.db)
        .await
        .unwrap();

    let err = db
        .store()
        .create_or_get(&fp, ReceiptMetadata::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::IdCollision { ref id, .. } if id == fp.id.as_str()));
    let kept = db.store().get_by_id(fp.id.as_str()).await.unwrap().unwrap();
    assert_eq!(kept.filename.as_deref(), Some("squatter.bin"));
    assert_eq!(db.receipt_count().await, 1);
}

#[tokio::test]
async fn unparseable_stored_hash_is_a_collision() {
    let db = TestDb::new().await;
    let fp = Fingerprint::compute(b"corrupted neighbour");

    let damaged = receipt::ActiveModel {
        id: Set(fp.id.to_string()),
        content_hash: Set("not-a-hash".into()),
        created_at: Set(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        filename: Set(None),
        mime: Set(None),
        size_bytes: Set(None),
    };
    receipt::Entity::insert(damaged)
        .exec_without_returning(&db.db)
        .await
        .unwrap();

    let err = db
        .store()
        .create_or_get(&fp, ReceiptMetadata::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::IdCollision { ref existing_hash, .. } if existing_hash == "not-a-hash"
    ));
}

#[tokio::test]
async fn size_beyond_column_range_is_rejected_before_writing() {
    let db = TestDb::new().await;
    let mut fp = Fingerprint::compute(b"huge");
    fp.size_bytes = u64::MAX;

    let err = db
        .store()
        .create_or_get(&fp, ReceiptMetadata::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::SizeOutOfRange(u64::MAX)));
    assert_eq!(db.receipt_count().await, 0);
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let db = TestDb::new().await;
    let fp = Fingerprint::compute(b"survives migration");
    db.store()
        .create_or_get(&fp, ReceiptMetadata::default())
        .await
        .unwrap();

    receipt_server::database::migrate(&db.db).await.unwrap();
    receipt_server::database::migrate(&db.db).await.unwrap();

    assert_eq!(db.receipt_count().await, 1);
}

#[tokio::test]
async fn failed_statements_are_unavailable() {
    let db = TestDb::new().await;
    let store = db.store();
    db.db
        .execute_unprepared("DROP TABLE receipts")
        .await
        .expect("Failed to drop table");

    let err = store
        .create_or_get(&Fingerprint::compute(b"x"), ReceiptMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    let err = store.get_by_id("or_2cf24dba5fb0").await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}
