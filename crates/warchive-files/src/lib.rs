//! Attachment store — the directory of uploaded record images.
//!
//! Files are keyed by a generated name of the form
//! `<millisecond-timestamp>-<random-int 0..1000>.<original-extension>`.
//! Collisions are theoretically possible but not guarded against.
//!
//! Removal is best-effort: failures are traced and discarded, never
//! propagated to the owning request.

use std::path::{Path, PathBuf};

use rand::Rng as _;
use tokio::{fs, io::AsyncWriteExt as _};

pub mod error;

pub use error::{Error, Result};

/// A directory of uploaded files with generated names.
///
/// Handlers share one instance behind an `Arc`.
pub struct AttachmentStore {
  root: PathBuf,
}

impl AttachmentStore {
  /// Open the store at `root`, creating the directory if needed.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Full on-disk path for a stored name.
  pub fn path_of(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }

  /// Whether a stored name currently exists on disk.
  pub async fn contains(&self, name: &str) -> bool {
    fs::try_exists(self.path_of(name)).await.unwrap_or(false)
  }

  /// Persist `data` under a newly generated name, keeping the extension of
  /// `original_name`. Returns the stored name.
  ///
  /// The write goes through a temp file + rename so a crashed request never
  /// leaves a half-written attachment under a live name.
  pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
    let name = generate_name(original_name);
    let path = self.path_of(&name);

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(&temp_path, &path).await?;

    tracing::debug!(name = %name, size = data.len(), "attachment stored");
    Ok(name)
  }

  /// Best-effort removal. The result is discardable: `true` means the file
  /// was deleted, `false` that it was already gone or the delete failed.
  pub async fn remove(&self, name: &str) -> bool {
    match fs::remove_file(self.path_of(name)).await {
      Ok(())   => true,
      Err(err) => {
        tracing::debug!(name = %name, error = %err, "attachment removal skipped");
        false
      }
    }
  }
}

/// `<millis>-<rand 0..1000>` plus the original extension, if there is one.
fn generate_name(original_name: &str) -> String {
  let stamp = chrono::Utc::now().timestamp_millis();
  let suffix: u16 = rand::thread_rng().gen_range(0..1000);
  match original_name.rsplit_once('.') {
    Some((_, ext)) if !ext.is_empty() => format!("{stamp}-{suffix}.{ext}"),
    _ => format!("{stamp}-{suffix}"),
  }
}
