//! Handlers for the war-record endpoints.
//!
//! | Method   | Path           | Notes                                   |
//! |----------|----------------|-----------------------------------------|
//! | `GET`    | `/all`         | Count + every record                    |
//! | `GET`    | `/read/{id}`   | 400 non-numeric id, 404 if not found    |
//! | `POST`   | `/create`      | Multipart form, optional `image` part   |
//! | `PUT`    | `/update/{id}` | Partial update, may replace the image   |
//! | `DELETE` | `/delete/{id}` | Removes the record and its image        |
//!
//! Path ids are taken as raw strings and parsed explicitly so a non-numeric
//! id is rejected before any store access.

use axum::{
  Json,
  extract::{Multipart, Path, State},
};
use serde::Serialize;
use warchive_core::{
  record::{RecordPatch, WarRecord, parse_record_id},
  store::RecordStore,
};

use crate::{AppState, error::ApiError};
use crate::form::{RecordForm, read_record_form};

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// Body of `GET /all`. The upstream wire contract capitalises these keys.
#[derive(Debug, Serialize)]
pub struct RecordListing {
  #[serde(rename = "Message")]
  pub message: String,
  #[serde(rename = "Records")]
  pub records: Vec<WarRecord>,
}

/// `GET /all` — never fails on an empty store.
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<RecordListing>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  let records = state.store.list_records().await.map_err(store_err)?;
  Ok(Json(RecordListing {
    message: format!("{} records retrieved successfully", records.len()),
    records,
  }))
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /read/{id}`
pub async fn read<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<WarRecord>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  let id = parse_record_id(&raw_id)?;
  let record = state
    .store
    .get_record(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("Record {id} not found")))?;
  Ok(Json(record))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
  pub message: String,
  #[serde(rename = "Record")]
  pub record:  WarRecord,
}

/// `POST /create` — multipart form: `title`, `startYear`, `endYear?`,
/// `description`, `image?`.
///
/// Field validation runs before the upload is persisted, so a 400 never
/// leaves an orphan file behind.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  multipart: Multipart,
) -> Result<Json<CreatedResponse>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  let RecordForm { draft, upload } = read_record_form(multipart).await?;
  let mut input = draft.into_new_record(None)?;

  if let Some(upload) = upload {
    let name = state.files.save(&upload.original_name, &upload.data).await?;
    input.file_name = Some(name);
  }

  let record = state.store.insert_record(input).await.map_err(store_err)?;
  tracing::info!(id = record.id, "record created");

  Ok(Json(CreatedResponse {
    message: "Record created successfully".to_string(),
    record,
  }))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MessageResponse {
  pub message: String,
}

/// `PUT /update/{id}` — partial update; supplied fields overwrite, omitted
/// fields are preserved.
///
/// The nothing-to-update check happens before any side effect: an `image`
/// part alone does not count as an update and is not persisted. When a new
/// file replaces a stored one, the old file is reclaimed best-effort.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  let id = parse_record_id(&raw_id)?;
  let RecordForm { draft, upload } = read_record_form(multipart).await?;

  if draft.is_empty() {
    return Err(warchive_core::Error::NothingToUpdate.into());
  }

  let saved_name = match upload {
    Some(upload) => {
      Some(state.files.save(&upload.original_name, &upload.data).await?)
    }
    None => None,
  };

  let patch = RecordPatch::from_draft(draft, saved_name.clone());
  let previous = state
    .store
    .update_record(id, patch)
    .await
    .map_err(store_err)?;

  let Some(previous) = previous else {
    // The upload was written before we learned the record is gone; reclaim
    // it so a 404 leaves no orphan.
    if let Some(name) = &saved_name {
      state.files.remove(name).await;
    }
    return Err(ApiError::NotFound(format!("Record {id} not found")));
  };

  if saved_name.is_some() {
    if let Some(old_name) = &previous.file_name {
      state.files.remove(old_name).await;
    }
  }

  tracing::info!(id, replaced_file = saved_name.is_some(), "record updated");
  Ok(Json(MessageResponse {
    message: format!("Record {id} updated successfully"),
  }))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /delete/{id}`
///
/// The store deletes and returns the row in one step; a missing id performs
/// no filesystem mutation. File removal is best-effort.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  let id = parse_record_id(&raw_id)?;
  let deleted = state
    .store
    .delete_record(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("Record {id} not found")))?;

  if let Some(name) = &deleted.file_name {
    state.files.remove(name).await;
  }

  tracing::info!(id, "record deleted");
  Ok(Json(MessageResponse {
    message: format!("Record {id} successfully deleted"),
  }))
}
