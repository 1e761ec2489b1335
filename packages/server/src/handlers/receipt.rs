use axum::Json;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use common::{Fingerprint, FingerprintHasher};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::path::AppPath;
use crate::models::receipt::{IssuedReceiptResponse, ReceiptResponse};
use crate::state::AppState;
use crate::store::ReceiptMetadata;
use crate::utils::filename::{normalize_filename, resolve_mime};

/// Multipart framing allowance on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn receipt_upload_body_limit(max_upload_bytes: u64) -> DefaultBodyLimit {
    let limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// A fingerprinted file part plus what the client said about it.
struct Upload {
    fingerprint: Fingerprint,
    metadata: ReceiptMetadata,
}

#[utoipa::path(
    post,
    path = "/receipts",
    tag = "Receipts",
    operation_id = "createReceipt",
    summary = "Issue a receipt for a file",
    description = "Fingerprints the `file` multipart part and returns its receipt. \
        Uploading identical bytes again returns the original receipt unchanged; \
        filename and type sent on later uploads are ignored.",
    request_body(content_type = "multipart/form-data", description = "A `file` part"),
    responses(
        (status = 200, description = "Receipt issued or already existing", body = IssuedReceiptResponse),
        (status = 400, description = "Missing file or malformed body", body = ErrorBody),
        (status = 409, description = "Receipt id held by different content", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IssuedReceiptResponse>, AppError> {
    // A body that is not multipart at all carries no file.
    let mut multipart = multipart.map_err(|_| AppError::MissingFile)?;
    let limit = state.config.server.max_upload_bytes;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        // Only the first file part named `file` counts; text fields named
        // `file` carry no bytes to fingerprint.
        if upload.is_some() || field.name() != Some("file") {
            continue;
        }
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let declared_mime = field.content_type().map(str::to_owned);

        let fingerprint = fingerprint_field(field, limit).await?;
        let filename = normalize_filename(&raw_name);
        let mime = resolve_mime(declared_mime.as_deref(), filename.as_deref());

        upload = Some(Upload {
            fingerprint,
            metadata: ReceiptMetadata { filename, mime },
        });
    }

    let upload = upload.ok_or(AppError::MissingFile)?;

    let receipt = state
        .store
        .create_or_get(&upload.fingerprint, upload.metadata)
        .await?;

    Ok(Json(IssuedReceiptResponse::from(receipt)))
}

#[utoipa::path(
    get,
    path = "/receipts/{id}",
    tag = "Receipts",
    operation_id = "getReceipt",
    summary = "Look up a receipt",
    description = "Exact, case-sensitive lookup by receipt id.",
    params(("id" = String, Path, description = "Receipt id, e.g. `or_2cf24dba5fb0`")),
    responses(
        (status = 200, description = "Receipt found", body = ReceiptResponse),
        (status = 400, description = "Missing id", body = ErrorBody),
        (status = 404, description = "No such receipt", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_receipt(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<ReceiptResponse>, AppError> {
    if id.trim().is_empty() {
        return Err(AppError::MissingId);
    }

    let receipt = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ReceiptResponse::from(receipt)))
}

#[utoipa::path(
    get,
    path = "/receipts",
    tag = "Receipts",
    operation_id = "getReceiptWithoutId",
    summary = "Look up a receipt without an id",
    description = "Always rejected; the id belongs in the path.",
    responses(
        (status = 400, description = "Missing id", body = ErrorBody),
    ),
)]
pub async fn missing_receipt_id() -> AppError {
    AppError::MissingId
}

/// Hash a multipart field chunk by chunk, enforcing the size limit.
async fn fingerprint_field(mut field: Field<'_>, limit: u64) -> Result<Fingerprint, AppError> {
    let mut hasher = FingerprintHasher::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
        if hasher.size_bytes() + chunk.len() as u64 > limit {
            return Err(AppError::PayloadTooLarge { limit });
        }
        hasher.update(&chunk);
    }

    Ok(hasher.finalize())
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::InvalidInput(format!("Multipart error: {}", err.body_text()))
    }
}
