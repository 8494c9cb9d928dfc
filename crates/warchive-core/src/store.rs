//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `warchive-store-sqlite`). The HTTP layer (`warchive-api`) depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::record::{NewWarRecord, RecordPatch, WarRecord};

/// Abstraction over a war-record store backend.
///
/// Mutating operations that need a read-then-write (update, delete) are
/// performed atomically inside the backend, and return the record as it was
/// *before* the mutation so callers can reclaim a replaced or orphaned
/// attachment.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List every record, ordered by id (insertion order). Never fails on an
  /// empty store.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<WarRecord>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<WarRecord>, Self::Error>> + Send + '_;

  /// Persist a new record and return it with its store-assigned id.
  fn insert_record(
    &self,
    input: NewWarRecord,
  ) -> impl Future<Output = Result<WarRecord, Self::Error>> + Send + '_;

  /// Apply `patch` to the record `id`, preserving omitted fields.
  ///
  /// Returns the record as it was before the patch, or `None` if no record
  /// has that id. The read and write happen atomically in the backend.
  fn update_record(
    &self,
    id: i64,
    patch: RecordPatch,
  ) -> impl Future<Output = Result<Option<WarRecord>, Self::Error>> + Send + '_;

  /// Delete the record `id`, returning the deleted row, or `None` if no
  /// record has that id. Fetch and delete happen atomically in the backend.
  fn delete_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<WarRecord>, Self::Error>> + Send + '_;
}
