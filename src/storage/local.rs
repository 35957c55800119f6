//! Local filesystem storage implementation.
//!
//! Documents are written atomically: serialized to a temp file next to the
//! target, then renamed over it. Output is pretty-printed JSON with
//! four-space indentation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::PrettyFormatter;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::ResultMap;
use crate::storage::ResultStorage;

/// Stores the result map in a single JSON file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing to the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Serialize `value` as indented JSON.
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    Ok(bytes)
}

/// Write bytes atomically (write to temp, then rename).
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Write JSON data.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_json_bytes(value)?;
    write_bytes(path, &bytes).await
}

/// Read JSON data, returning None if the file doesn't exist.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

#[async_trait]
impl ResultStorage for LocalStorage {
    async fn save(&self, results: &ResultMap) -> Result<()> {
        write_json(&self.path, results).await
    }

    async fn load(&self) -> Result<Option<ResultMap>> {
        read_json(&self.path).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
