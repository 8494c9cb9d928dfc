//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use warchive_core::{
  record::{NewWarRecord, RecordPatch, WarRecord},
  store::RecordStore,
};

use crate::{Result, schema::SCHEMA};

const COLUMNS: &str = "id, title, start_year, end_year, description, file_name";

/// Map one `war_records` row. Column order must match [`COLUMNS`].
fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WarRecord> {
  Ok(WarRecord {
    id:          row.get(0)?,
    title:       row.get(1)?,
    start_year:  row.get(2)?,
    end_year:    row.get(3)?,
    description: row.get(4)?,
    file_name:   row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A war-record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised on the connection's worker thread, which is what makes the
/// read-then-write operations below atomic.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn list_records(&self) -> Result<Vec<WarRecord>> {
    let records = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {COLUMNS} FROM war_records ORDER BY id"))?;
        let rows = stmt
          .query_map([], record_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(records)
  }

  async fn get_record(&self, id: i64) -> Result<Option<WarRecord>> {
    let record = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM war_records WHERE id = ?1"),
              rusqlite::params![id],
              record_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(record)
  }

  async fn insert_record(&self, input: NewWarRecord) -> Result<WarRecord> {
    let record = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO war_records (title, start_year, end_year, description, file_name)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.title,
            input.start_year,
            input.end_year,
            input.description,
            input.file_name,
          ],
        )?;
        Ok(WarRecord {
          id:          conn.last_insert_rowid(),
          title:       input.title,
          start_year:  input.start_year,
          end_year:    input.end_year,
          description: input.description,
          file_name:   input.file_name,
        })
      })
      .await?;
    Ok(record)
  }

  async fn update_record(
    &self,
    id: i64,
    patch: RecordPatch,
  ) -> Result<Option<WarRecord>> {
    let previous = self
      .conn
      .call(move |conn| {
        // Read and write run back-to-back on the connection thread, so no
        // other caller can interleave between them.
        let current = conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM war_records WHERE id = ?1"),
            rusqlite::params![id],
            record_from_row,
          )
          .optional()?;

        let Some(current) = current else {
          return Ok(None);
        };

        let merged = patch.apply(&current);
        conn.execute(
          "UPDATE war_records
           SET title = ?2, start_year = ?3, end_year = ?4,
               description = ?5, file_name = ?6
           WHERE id = ?1",
          rusqlite::params![
            id,
            merged.title,
            merged.start_year,
            merged.end_year,
            merged.description,
            merged.file_name,
          ],
        )?;

        Ok(Some(current))
      })
      .await?;
    Ok(previous)
  }

  async fn delete_record(&self, id: i64) -> Result<Option<WarRecord>> {
    let deleted = self
      .conn
      .call(move |conn| {
        let current = conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM war_records WHERE id = ?1"),
            rusqlite::params![id],
            record_from_row,
          )
          .optional()?;

        let Some(current) = current else {
          return Ok(None);
        };

        conn.execute(
          "DELETE FROM war_records WHERE id = ?1",
          rusqlite::params![id],
        )?;

        Ok(Some(current))
      })
      .await?;
    Ok(deleted)
  }
}
