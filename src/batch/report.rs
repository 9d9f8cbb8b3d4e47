//! Writing the result log and the memory snapshot.

use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use super::error::BatchError;
use crate::agent::ProcessingResult;
use crate::memory::MemoryStore;

/// Write `value` as pretty JSON, atomically.
///
/// Writes a sibling temp file, syncs it, then renames it over `path`.
///
/// # Errors
///
/// Returns `BatchError` if serialization or any file operation fails.
pub async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), BatchError> {
    let content = serde_json::to_string_pretty(value)?;
    let write_err = |source| BatchError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(write_err)?;
    file.write_all(content.as_bytes()).await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    drop(file);

    tokio::fs::rename(&temp_path, path).await.map_err(write_err)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote output");
    Ok(())
}

/// Write the results array and a snapshot of all learned reviews.
///
/// # Errors
///
/// Returns `BatchError` if memory cannot be read or a file cannot be written.
pub async fn write_outputs(
    results: &[ProcessingResult],
    store: &MemoryStore,
    results_path: &Path,
    snapshot_path: &Path,
) -> Result<(), BatchError> {
    write_json_atomic(results_path, results).await?;
    let reviews = store.load_all().await?;
    write_json_atomic(snapshot_path, &reviews).await?;
    tracing::info!(
        results = results.len(),
        reviews = reviews.len(),
        results_path = %results_path.display(),
        snapshot_path = %snapshot_path.display(),
        "Saved outputs"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_json_atomic_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("result.json");

        write_json_atomic(&path, &serde_json::json!({"a": 1}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"a\": 1"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_write_json_atomic_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.json");
        write_json_atomic(&path, &[1]).await.unwrap();
        write_json_atomic(&path, &[2, 3]).await.unwrap();

        let value: Vec<u32> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, [2, 3]);
    }
}
