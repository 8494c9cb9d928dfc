//! Multipart form reading for the create and update operations.
//!
//! Both operations accept the same field set: `title`, `startYear`,
//! `endYear`, `description`, and an optional `image` file part. Unknown
//! fields are ignored. Empty text values are normalised to "not supplied" so
//! presence validation and the nothing-to-update check see one shape.

use axum::extract::Multipart;
use bytes::Bytes;
use warchive_core::record::RecordDraft;

use crate::error::ApiError;

/// An uploaded file part, held in memory until it is handed to the
/// attachment store.
pub struct Upload {
  pub original_name: String,
  pub data:          Bytes,
}

/// The decoded form: text fields plus the optional upload.
pub struct RecordForm {
  pub draft:  RecordDraft,
  pub upload: Option<Upload>,
}

/// Drain `multipart` into a [`RecordForm`].
pub async fn read_record_form(
  mut multipart: Multipart,
) -> Result<RecordForm, ApiError> {
  let mut draft = RecordDraft::default();
  let mut upload = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::InvalidArgument(e.to_string()))?
  {
    let name = field.name().unwrap_or("").to_string();
    match name.as_str() {
      "title" => draft.title = text_value(field).await?,
      "startYear" => draft.start_year = text_value(field).await?,
      "endYear" => draft.end_year = text_value(field).await?,
      "description" => draft.description = text_value(field).await?,
      "image" => {
        let original_name =
          field.file_name().unwrap_or("upload").to_string();
        let data = field
          .bytes()
          .await
          .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
        // A file input submitted without a selection arrives as an empty
        // part; treat it as "no upload".
        if !data.is_empty() {
          upload = Some(Upload { original_name, data });
        }
      }
      _ => {} // ignore unknown fields
    }
  }

  Ok(RecordForm { draft, upload })
}

async fn text_value(
  field: axum::extract::multipart::Field<'_>,
) -> Result<Option<String>, ApiError> {
  let text = field
    .text()
    .await
    .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;
  Ok((!text.is_empty()).then_some(text))
}
