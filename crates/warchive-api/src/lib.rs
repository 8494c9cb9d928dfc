//! JSON REST API for Warchive.
//!
//! Exposes an axum [`Router`] backed by any
//! [`warchive_core::store::RecordStore`] plus an attachment directory.
//! Transport concerns (TLS, timeouts) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = warchive_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod form;
pub mod handlers;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use serde::Deserialize;
use tower_http::services::ServeDir;
use warchive_core::store::RecordStore;
use warchive_files::AttachmentStore;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WARCHIVE_*` environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub upload_dir: PathBuf,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store: Arc<S>,
  pub files: Arc<AttachmentStore>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the record-service [`Router`].
///
/// Uploaded images are also served statically under `/images/{name}`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  use handlers::records;

  let images = ServeDir::new(state.files.root().to_path_buf());

  Router::new()
    .route("/all",          get(records::list::<S>))
    .route("/read/{id}",    get(records::read::<S>))
    .route("/create",       post(records::create::<S>))
    .route("/update/{id}",  put(records::update::<S>))
    .route("/delete/{id}",  delete(records::delete::<S>))
    .nest_service("/images", images)
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt as _;
  use warchive_store_sqlite::SqliteStore;

  const BOUNDARY: &str = "warchive-test-boundary";

  async fn make_state() -> (AppState<SqliteStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open_in_memory().await.expect("store");
    let files = AttachmentStore::open(dir.path().join("images"))
      .await
      .expect("attachment store");

    let state = AppState {
      store: Arc::new(store),
      files: Arc::new(files),
    };
    (state, dir)
  }

  /// Build a multipart/form-data body from text fields plus an optional
  /// `image` file part.
  fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
  ) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; \
           name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
      );
    }
    if let Some((filename, data)) = file {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; \
           name=\"image\"; filename=\"{filename}\"\r\n\
           Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
      );
      body.extend_from_slice(data);
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    form: Option<Vec<u8>>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match form {
      Some(bytes) => {
        builder = builder.header(
          header::CONTENT_TYPE,
          format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        Body::from(bytes)
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn wwii_fields() -> Vec<(&'static str, &'static str)> {
    vec![
      ("title", "WWII"),
      ("startYear", "1939"),
      ("endYear", "1945"),
      ("description", "Global conflict"),
    ]
  }

  /// Create a record and return its id plus the (optional) stored file name.
  async fn create_record(
    state: &AppState<SqliteStore>,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
  ) -> (i64, Option<String>) {
    let resp = send(
      state.clone(),
      "POST",
      "/create",
      Some(multipart_body(fields, file)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let record = &json["Record"];
    (
      record["id"].as_i64().unwrap(),
      record["fileName"].as_str().map(str::to_owned),
    )
  }

  fn image_count(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path().join("images")).unwrap().count()
  }

  // ── List ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_empty_store_returns_zero_count() {
    let (state, _dir) = make_state().await;
    let resp = send(state, "GET", "/all", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["Message"], "0 records retrieved successfully");
    assert_eq!(json["Records"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn list_counts_created_records() {
    let (state, _dir) = make_state().await;
    create_record(&state, &wwii_fields(), None).await;
    create_record(&state, &wwii_fields(), None).await;

    let json = body_json(send(state, "GET", "/all", None).await).await;
    assert_eq!(json["Message"], "2 records retrieved successfully");
    assert_eq!(json["Records"].as_array().unwrap().len(), 2);
  }

  // ── Read ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn read_non_numeric_id_is_bad_request() {
    let (state, _dir) = make_state().await;
    let resp = send(state, "GET", "/read/abc", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Invalid record ID");
  }

  #[tokio::test]
  async fn read_missing_id_is_not_found() {
    let (state, _dir) = make_state().await;
    let resp = send(state, "GET", "/read/99", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Record 99 not found");
  }

  #[tokio::test]
  async fn create_then_read_round_trips_fields() {
    let (state, _dir) = make_state().await;
    let (id, file_name) = create_record(&state, &wwii_fields(), None).await;
    assert_eq!(file_name, None);

    let resp = send(state, "GET", &format!("/read/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["title"], "WWII");
    assert_eq!(json["startYear"], "1939");
    assert_eq!(json["endYear"], "1945");
    assert_eq!(json["description"], "Global conflict");
    assert_eq!(json["fileName"], serde_json::Value::Null);
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_validation_is_ordered_and_short_circuits() {
    let (state, dir) = make_state().await;

    let resp = send(
      state.clone(),
      "POST",
      "/create",
      Some(multipart_body(&[], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "title must have value.");

    let resp = send(
      state.clone(),
      "POST",
      "/create",
      Some(multipart_body(&[("title", "WWII")], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "startYear must have value.");

    let resp = send(
      state.clone(),
      "POST",
      "/create",
      Some(multipart_body(
        &[("title", "WWII"), ("startYear", "1939")],
        None,
      )),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      body_json(resp).await["message"],
      "description must have a value."
    );

    // Validation failed before any upload could be persisted.
    assert_eq!(image_count(&dir), 0);
  }

  #[tokio::test]
  async fn create_treats_empty_field_as_missing() {
    let (state, _dir) = make_state().await;
    let resp = send(
      state,
      "POST",
      "/create",
      Some(multipart_body(
        &[("title", ""), ("startYear", "1939"), ("description", "x")],
        None,
      )),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "title must have value.");
  }

  #[tokio::test]
  async fn create_with_file_stores_it_and_sets_file_name() {
    let (state, dir) = make_state().await;
    let (_id, file_name) = create_record(
      &state,
      &wwii_fields(),
      Some(("flag.png", b"png-bytes".as_slice())),
    )
    .await;

    let file_name = file_name.expect("fileName set");
    assert!(file_name.ends_with(".png"));
    assert!(state.files.contains(&file_name).await);
    assert_eq!(image_count(&dir), 1);
  }

  #[tokio::test]
  async fn stored_image_is_served_statically() {
    let (state, _dir) = make_state().await;
    let (_id, file_name) = create_record(
      &state,
      &wwii_fields(),
      Some(("flag.png", b"png-bytes".as_slice())),
    )
    .await;

    let resp = send(
      state,
      "GET",
      &format!("/images/{}", file_name.unwrap()),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"png-bytes");
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_non_numeric_id_is_bad_request() {
    let (state, _dir) = make_state().await;
    let resp = send(
      state,
      "PUT",
      "/update/not-a-number",
      Some(multipart_body(&[("title", "x")], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Invalid record ID");
  }

  #[tokio::test]
  async fn update_with_no_fields_is_nothing_to_update() {
    let (state, _dir) = make_state().await;

    // Applies whether or not the record exists.
    let resp = send(
      state.clone(),
      "PUT",
      "/update/12345",
      Some(multipart_body(&[], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      body_json(resp).await["message"],
      "No values selected to update"
    );

    let (id, _) = create_record(&state, &wwii_fields(), None).await;
    let resp = send(
      state,
      "PUT",
      &format!("/update/{id}"),
      Some(multipart_body(&[], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn update_with_only_image_is_nothing_to_update_and_stores_nothing() {
    let (state, dir) = make_state().await;
    let (id, _) = create_record(&state, &wwii_fields(), None).await;

    let resp = send(
      state,
      "PUT",
      &format!("/update/{id}"),
      Some(multipart_body(&[], Some(("flag.png", b"png".as_slice())))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(image_count(&dir), 0);
  }

  #[tokio::test]
  async fn update_missing_id_is_not_found_and_reclaims_upload() {
    let (state, dir) = make_state().await;
    let resp = send(
      state,
      "PUT",
      "/update/77",
      Some(multipart_body(
        &[("title", "Edited")],
        Some(("flag.png", b"png".as_slice())),
      )),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Record 77 not found");
    assert_eq!(image_count(&dir), 0);
  }

  #[tokio::test]
  async fn update_preserves_omitted_fields() {
    let (state, _dir) = make_state().await;
    let (id, _) = create_record(&state, &wwii_fields(), None).await;

    let resp = send(
      state.clone(),
      "PUT",
      &format!("/update/{id}"),
      Some(multipart_body(&[("title", "Second World War")], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await["message"],
      format!("Record {id} updated successfully")
    );

    let json =
      body_json(send(state, "GET", &format!("/read/{id}"), None).await).await;
    assert_eq!(json["title"], "Second World War");
    assert_eq!(json["startYear"], "1939");
    assert_eq!(json["endYear"], "1945");
    assert_eq!(json["description"], "Global conflict");
  }

  #[tokio::test]
  async fn update_with_new_file_replaces_old_one() {
    let (state, dir) = make_state().await;
    let (id, old_name) = create_record(
      &state,
      &wwii_fields(),
      Some(("old.png", b"old".as_slice())),
    )
    .await;
    let old_name = old_name.unwrap();

    let resp = send(
      state.clone(),
      "PUT",
      &format!("/update/{id}"),
      Some(multipart_body(
        &[("title", "WWII (revised)")],
        Some(("new.jpg", b"new".as_slice())),
      )),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The old file is gone; exactly one (new) file remains.
    assert!(!state.files.contains(&old_name).await);
    assert_eq!(image_count(&dir), 1);

    let json = body_json(
      send(state.clone(), "GET", &format!("/read/{id}"), None).await,
    )
    .await;
    let new_name = json["fileName"].as_str().unwrap();
    assert_ne!(new_name, old_name);
    assert!(new_name.ends_with(".jpg"));
    assert!(state.files.contains(new_name).await);
  }

  #[tokio::test]
  async fn update_without_file_keeps_stored_file() {
    let (state, dir) = make_state().await;
    let (id, name) = create_record(
      &state,
      &wwii_fields(),
      Some(("keep.png", b"keep".as_slice())),
    )
    .await;
    let name = name.unwrap();

    let resp = send(
      state.clone(),
      "PUT",
      &format!("/update/{id}"),
      Some(multipart_body(&[("description", "Edited")], None)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(state.files.contains(&name).await);
    assert_eq!(image_count(&dir), 1);

    let json =
      body_json(send(state, "GET", &format!("/read/{id}"), None).await).await;
    assert_eq!(json["fileName"], name.as_str());
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_non_numeric_id_is_bad_request() {
    let (state, _dir) = make_state().await;
    let resp = send(state, "DELETE", "/delete/abc", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn delete_missing_id_is_not_found_without_fs_mutation() {
    let (state, dir) = make_state().await;
    create_record(
      &state,
      &wwii_fields(),
      Some(("flag.png", b"png".as_slice())),
    )
    .await;

    let resp = send(state, "DELETE", "/delete/555", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(image_count(&dir), 1);
  }

  #[tokio::test]
  async fn delete_removes_record_and_file() {
    let (state, dir) = make_state().await;
    let (id, name) = create_record(
      &state,
      &wwii_fields(),
      Some(("flag.png", b"png".as_slice())),
    )
    .await;
    let name = name.unwrap();

    let resp = send(state.clone(), "DELETE", &format!("/delete/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await["message"],
      format!("Record {id} successfully deleted")
    );

    let resp = send(state.clone(), "GET", &format!("/read/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(!state.files.contains(&name).await);
    assert_eq!(image_count(&dir), 0);
  }
}
