//! Handlers for `/lists` endpoints: upload-and-distribute plus the read
//! views over stored distributions.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/lists/upload` | Multipart field `file` (`.csv`, `.xlsx`, `.xls`); returns 201 + [`UploadReceipt`] |
//! | `GET`    | `/lists` | [`DistributionSummary`] list, newest first |
//! | `GET`    | `/lists/:id` | Full [`DistributionSnapshot`]; 404 if not found |
//! | `DELETE` | `/lists/:id` | 204 |

use std::sync::Arc;

use allot_core::{
  distribution::{DistributionSnapshot, DistributionSummary, UploadReceipt},
  store::AllotStore,
};
use allot_ingest::SourceFormat;
use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::error::ApiError;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

// ─── Upload ───────────────────────────────────────────────────────────────────

/// Pull the first `file` field out of the form, with its client-side name.
async fn read_file_field(
  multipart: &mut Multipart,
) -> Result<Option<(String, Bytes)>, ApiError> {
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some(FILE_FIELD) {
      let file_name = field.file_name().unwrap_or_default().to_owned();
      let data = field.bytes().await?;
      return Ok(Some((file_name, data)));
    }
  }
  Ok(None)
}

/// `POST /lists/upload`: parse the file, split it across the active roster,
/// and persist the snapshot.
///
/// The roster is read exactly once, before the file is touched, and that list
/// is the one the records are partitioned over.
pub async fn upload<S>(
  State(store): State<Arc<S>>,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: AllotStore,
{
  let roster = store.active_roster().await.map_err(ApiError::store)?;
  if roster.is_empty() {
    tracing::warn!("upload rejected: no active agents");
    return Err(allot_core::Error::EmptyRoster.into());
  }

  let Some((file_name, data)) = read_file_field(&mut multipart).await? else {
    tracing::warn!("upload rejected: no file field");
    return Err(ApiError::BadRequest("No file uploaded".into()));
  };
  let format = SourceFormat::from_file_name(&file_name).inspect_err(|e| {
    tracing::warn!(file_name = %file_name, error = %e, "upload rejected: unsupported format");
  })?;

  let records =
    tokio::task::spawn_blocking(move || allot_ingest::parse(&data, format))
      .await
      .map_err(|e| ApiError::Internal(format!("parser task failed: {e}")))?
      .inspect_err(|e| {
        tracing::warn!(file_name = %file_name, error = %e, "upload rejected: unreadable file");
      })?;

  let snapshot = DistributionSnapshot::build(file_name, records, &roster)
    .inspect_err(|e| tracing::warn!(error = %e, "upload rejected"))?;

  store
    .save_distribution(&snapshot)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    distribution_id = %snapshot.distribution_id,
    file_name = %snapshot.file_name,
    total_records = snapshot.total_records,
    agent_count = snapshot.agent_count(),
    "distribution saved"
  );

  let receipt: UploadReceipt = snapshot.receipt();
  Ok((StatusCode::CREATED, Json(receipt)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /lists`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<DistributionSummary>>, ApiError>
where
  S: AllotStore,
{
  let summaries = store.list_distributions().await.map_err(ApiError::store)?;
  Ok(Json(summaries))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /lists/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DistributionSnapshot>, ApiError>
where
  S: AllotStore,
{
  let snapshot = store
    .get_distribution(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("distribution {id} not found")))?;
  Ok(Json(snapshot))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /lists/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AllotStore,
{
  if !store.delete_distribution(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("distribution {id} not found")));
  }
  tracing::info!(distribution_id = %id, "distribution deleted");
  Ok(StatusCode::NO_CONTENT)
}
