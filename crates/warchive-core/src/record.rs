//! War record entity and the per-operation input structs.
//!
//! The wire shape is camelCase (`startYear`, `fileName`); years travel as
//! text because the upstream form encodes everything as strings.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A persisted war record. `file_name` is the generated name of the stored
/// attachment, absent when none was ever uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarRecord {
  pub id:          i64,
  pub title:       String,
  pub start_year:  String,
  pub end_year:    Option<String>,
  pub description: String,
  pub file_name:   Option<String>,
}

/// Unvalidated create/update field set, one entry per recognised form key.
/// Empty strings are normalised to `None` at the form boundary, so `None`
/// uniformly means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
  pub title:       Option<String>,
  pub start_year:  Option<String>,
  pub end_year:    Option<String>,
  pub description: Option<String>,
}

impl RecordDraft {
  /// True when none of the four mutable fields was supplied.
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.start_year.is_none()
      && self.end_year.is_none()
      && self.description.is_none()
  }

  /// Ordered, short-circuiting presence validation for create: title, then
  /// startYear, then description. The first missing field decides the error.
  pub fn into_new_record(self, file_name: Option<String>) -> Result<NewWarRecord> {
    let title = self
      .title
      .ok_or(Error::MissingField("title must have value."))?;
    let start_year = self
      .start_year
      .ok_or(Error::MissingField("startYear must have value."))?;
    let description = self
      .description
      .ok_or(Error::MissingField("description must have a value."))?;

    Ok(NewWarRecord {
      title,
      start_year,
      end_year: self.end_year,
      description,
      file_name,
    })
  }
}

/// Validated create input. `file_name` is already the generated storage name.
#[derive(Debug, Clone)]
pub struct NewWarRecord {
  pub title:       String,
  pub start_year:  String,
  pub end_year:    Option<String>,
  pub description: String,
  pub file_name:   Option<String>,
}

/// Partial update. Supplied fields overwrite the stored value; omitted fields
/// are preserved. `file_name` is `Some` only when a new upload replaces the
/// stored attachment.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
  pub title:       Option<String>,
  pub start_year:  Option<String>,
  pub end_year:    Option<String>,
  pub description: Option<String>,
  pub file_name:   Option<String>,
}

impl RecordPatch {
  pub fn from_draft(draft: RecordDraft, file_name: Option<String>) -> Self {
    Self {
      title: draft.title,
      start_year: draft.start_year,
      end_year: draft.end_year,
      description: draft.description,
      file_name,
    }
  }

  /// Apply the patch to `current`, preserving omitted fields.
  pub fn apply(&self, current: &WarRecord) -> WarRecord {
    WarRecord {
      id:          current.id,
      title:       self.title.clone().unwrap_or_else(|| current.title.clone()),
      start_year:  self
        .start_year
        .clone()
        .unwrap_or_else(|| current.start_year.clone()),
      end_year:    self.end_year.clone().or_else(|| current.end_year.clone()),
      description: self
        .description
        .clone()
        .unwrap_or_else(|| current.description.clone()),
      file_name:   self.file_name.clone().or_else(|| current.file_name.clone()),
    }
  }
}

/// Parse a path id the way the HTTP surface expects: digits only, no store
/// access on failure.
pub fn parse_record_id(raw: &str) -> Result<i64> {
  raw
    .parse::<i64>()
    .map_err(|_| Error::InvalidId(raw.to_owned()))
}
