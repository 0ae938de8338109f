//! Filesystem blob storage for uploaded images.
//!
//! Blobs live flat under a single root directory, one file per generated
//! name. Writes are atomic (temp file + rename), and every name is checked
//! with [`is_safe_blob_name`] before it is joined onto the root.
//!
//! ## Example
//!
//! ```rust,ignore
//! use picpost_db::FilesystemBackend;
//! use picpost_core::BlobStore;
//!
//! let backend = FilesystemBackend::new("uploads");
//! backend.write("0b8f2c.png", &data).await?;
//! let bytes = backend.read("0b8f2c.png").await?;
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use picpost_core::media::PARTIAL_SUFFIX;
use picpost_core::{is_safe_blob_name, BlobEntry, BlobStore, Error, Result};

/// Filesystem storage backend.
///
/// Path format: `{base_path}/{name}`
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Root directory holding all blobs.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, name: &str) -> Result<PathBuf> {
        if !is_safe_blob_name(name) {
            return Err(Error::InvalidInput(format!("Unsafe blob name: {:?}", name)));
        }
        Ok(self.base_path.join(name))
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Performs a full round-trip test at startup to catch filesystem issues
    /// (permission errors, read-only mounts, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await; // Best-effort cleanup

        Ok(())
    }

    async fn write_atomic(&self, full_path: &Path, data: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await?;

        let mut temp_name = full_path.as_os_str().to_owned();
        temp_name.push(PARTIAL_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, full_path).await?;

        // Set permissions to 0644 (rw-r--r--, no execute)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BlobStore for FilesystemBackend {
    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(name)?;
        debug!(blob = %name, full_path = %full_path.display(), size = data.len(), "file_storage: write");

        self.write_atomic(&full_path, data).await.map_err(|e| {
            warn!(full_path = %full_path.display(), error = %e, "file_storage: write failed");
            Error::StorageWrite {
                path: full_path.display().to_string(),
                source: e,
            }
        })
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        if name.ends_with(PARTIAL_SUFFIX) {
            return Err(Error::NotFound(format!("Blob {} not found", name)));
        }
        let full_path = self.full_path(name)?;
        match fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Blob {} not found", name)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let full_path = self.full_path(name)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn list(&self) -> Result<Vec<BlobEntry>> {
        let mut dir = match fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_safe_blob_name(&name) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified_at: DateTime<Utc> = metadata.modified()?.into();
            entries.push(BlobEntry {
                name,
                size_bytes: metadata.len(),
                modified_at,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("a.png", b"\x89PNG data").await.unwrap();
        let data = backend.read("a.png").await.unwrap();
        assert_eq!(data, b"\x89PNG data");
    }

    #[tokio::test]
    async fn test_write_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path().join("nested/uploads"));

        backend.write("b.jpg", b"jpeg").await.unwrap();
        assert!(dir.path().join("nested/uploads/b.jpg").exists());
    }

    #[tokio::test]
    async fn test_write_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("c.gif", b"gif").await.unwrap();
        let names: Vec<String> = backend
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["c.gif".to_string()]);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        let err = backend.read("missing.png").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_partial_files_are_never_served() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("d.png.part"), b"half").unwrap();
        let backend = FilesystemBackend::new(dir.path());

        assert!(matches!(
            backend.read("d.png.part").await.unwrap_err(),
            Error::NotFound(_)
        ));
        // Still visible to list() so a sweep can remove it.
        assert_eq!(backend.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unsafe_names_rejected() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path().join("root"));
        std::fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();

        let err = backend.read("../secret.txt").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = backend.write("../escape.png", b"x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_write_failure_is_storage_write_error() {
        let dir = TempDir::new().unwrap();
        // Root path is a regular file, so directory creation fails.
        let root = dir.path().join("not-a-dir");
        std::fs::write(&root, b"file").unwrap();
        let backend = FilesystemBackend::new(&root);

        let err = backend.write("e.png", b"x").await.unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("f.png", b"x").await.unwrap();
        backend.delete("f.png").await.unwrap();
        backend.delete("f.png").await.unwrap();
        assert!(matches!(
            backend.read("f.png").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path().join("never-created"));
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_dotfiles_and_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("g.png"), b"png").unwrap();
        let backend = FilesystemBackend::new(dir.path());

        let entries = backend.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "g.png");
        assert_eq!(entries[0].size_bytes, 3);
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.validate().await.unwrap();
        assert!(!dir.path().join(".health-check").exists());
    }
}
