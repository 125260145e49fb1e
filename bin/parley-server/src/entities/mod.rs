//! Record store.
//!
//! [`FileStore`] keeps one pretty-printed JSON document per thread
//! (`{id}.json`) and the model list in the reserved [`MODELS_FILE`], all in a
//! single data directory. The per-concern interfaces live in [`ThreadStore`]
//! and [`ModelStore`]; handlers only see those traits.
//!
//! Every read goes to disk. There is no cache to invalidate and no
//! cross-request locking: concurrent writes to the same id are last-write-wins.
//! Writes land in a hidden temp file first and are renamed into place, so a
//! reader never observes a half-written document.

pub mod dao;
pub mod model;
pub mod thread;

pub use dao::{ModelConfig, ThreadDocument};

pub use model::ModelStore;
pub use thread::ThreadStore;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// File name of the model list inside the data directory.
pub const MODELS_FILE: &str = "models.json";

const MODELS_STEM: &str = "models";

const TMP_SUFFIX: &str = ".tmp";

/// Errors raised by [`FileStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id cannot be mapped onto a file name safely.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// No document exists for the given thread id.
    #[error("thread '{0}' not found")]
    NotFound(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document on disk is not the JSON we expect.
    #[error("malformed JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialise document: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// JSON-file record store rooted at a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store at `root`, creating the directory if it does not exist.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !tokio::fs::try_exists(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?
        {
            tokio::fs::create_dir_all(&root)
                .await
                .map_err(|e| StoreError::io(&root, e))?;
            info!(path = %root.display(), "created data directory");
        }
        let store = Self { root };
        store.sweep_temp_files().await?;
        Ok(store)
    }

    /// Remove temp files left behind by writes that never reached the rename.
    async fn sweep_temp_files(&self) -> Result<(), StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with('.') && name.ends_with(TMP_SUFFIX)) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to remove stale temp file"),
            }
        }
        if removed > 0 {
            info!(removed, "removed stale temp files");
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn models_path(&self) -> PathBuf {
        self.root.join(MODELS_FILE)
    }

    fn thread_path(&self, thread_id: &str) -> Result<PathBuf, StoreError> {
        validate_thread_id(thread_id)?;
        Ok(self.root.join(format!("{thread_id}.json")))
    }

    /// Serialise `value` with four-space indentation and move it into `path`
    /// via a temp file in the same directory.
    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let mut content = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut content, formatter);
        value.serialize(&mut ser).map_err(StoreError::Serialize)?;

        let tmp_path = self
            .root
            .join(format!(".{}{TMP_SUFFIX}", uuid::Uuid::new_v4().simple()));

        let write_result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(&content).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp_path, path).await
        }
        .await;

        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::io(path, e));
        }
        Ok(())
    }
}

/// Read and parse one JSON document. `Ok(None)` when the file is absent.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Reject ids that could escape the data directory or shadow the model list.
pub fn validate_thread_id(thread_id: &str) -> Result<(), StoreError> {
    if thread_id.is_empty() {
        return Err(StoreError::InvalidId("thread id cannot be empty".into()));
    }
    if thread_id.contains('/') || thread_id.contains('\\') || thread_id.contains("..") {
        return Err(StoreError::InvalidId(format!(
            "thread id contains path characters: {thread_id:?}"
        )));
    }
    if thread_id.chars().any(|c| c.is_control()) {
        return Err(StoreError::InvalidId(format!(
            "thread id contains control characters: {thread_id:?}"
        )));
    }
    if thread_id == MODELS_STEM {
        return Err(StoreError::InvalidId(format!(
            "thread id {thread_id:?} is reserved"
        )));
    }
    Ok(())
}
