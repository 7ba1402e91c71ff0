//! Filesystem seam for the generated project
//!
//! Everything that mutates the project directory goes through
//! [`ProjectFs`], so the same installers run against disk ([`RealFs`]) or
//! memory ([`MemoryFs`]).

mod memory;

pub use memory::MemoryFs;

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

#[async_trait]
pub trait ProjectFs: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write a file, creating parent directories as needed
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> bool;

    async fn is_dir(&self, path: &Path) -> bool;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Names of the direct children of a directory
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Every file below `dir`, recursively
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// [`ProjectFs`] backed by tokio's filesystem operations
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

#[async_trait]
impl ProjectFs for RealFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        tracing::debug!(path = %path.display(), bytes = contents.len(), "write");
        fs::write(path, contents).await
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tracing::debug!(path = %path.display(), "remove file");
        fs::remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        tracing::debug!(path = %path.display(), "remove directory");
        fs::remove_dir_all(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            for entry in WalkDir::new(&dir).sort_by_file_name() {
                let entry = entry.map_err(io::Error::other)?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Ok(files)
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_real_fs_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client/src/App.tsx");

        RealFs.write(&path, b"export {}").await.unwrap();

        assert!(RealFs.exists(&path).await);
        assert!(RealFs.is_dir(&dir.path().join("client")).await);
        assert_eq!(RealFs.read_to_string(&path).await.unwrap(), "export {}");
    }

    #[tokio::test]
    async fn test_real_fs_list_and_remove() {
        let dir = TempDir::new().unwrap();
        RealFs.write(&dir.path().join("a/one.ts"), b"1").await.unwrap();
        RealFs.write(&dir.path().join("a/b/two.ts"), b"2").await.unwrap();

        let files = RealFs.list_files(&dir.path().join("a")).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(RealFs.read_dir(&dir.path().join("a")).await.unwrap(), vec!["b", "one.ts"]);

        RealFs.remove_dir_all(&dir.path().join("a")).await.unwrap();
        assert!(!RealFs.exists(&dir.path().join("a")).await);
    }
}
