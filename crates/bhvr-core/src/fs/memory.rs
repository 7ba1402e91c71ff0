//! In-memory [`ProjectFs`]

use super::ProjectFs;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl Tree {
    fn add_parents(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }
}

/// Files held in a map, with a count of every mutation
///
/// Useful wherever a run must be observed without touching disk.
#[derive(Debug, Default)]
pub struct MemoryFs {
    tree: Mutex<Tree>,
    mutations: AtomicUsize,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a mutation
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.lock();
        tree.add_parents(&path);
        tree.files.insert(path, contents.as_ref().to_vec());
    }

    /// Seed an empty directory without counting it as a mutation
    pub fn insert_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut tree = self.lock();
        tree.add_parents(&path);
        tree.dirs.insert(path);
    }

    /// Number of writes, creations and removals so far
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock()
            .files
            .get(path.as_ref())
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Snapshot of every file, for comparing states
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.lock().files.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn touch(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

#[async_trait]
impl ProjectFs for MemoryFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.touch();
        let mut tree = self.lock();
        if tree.files.contains_key(path.parent().unwrap_or(Path::new(""))) {
            return Err(io::Error::other(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        tree.add_parents(path);
        tree.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        let tree = self.lock();
        tree.files.contains_key(path) || tree.dirs.contains(path)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        self.lock().dirs.contains(path)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.touch();
        let mut tree = self.lock();
        tree.add_parents(path);
        tree.dirs.insert(path.to_path_buf());
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.touch();
        self.lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.touch();
        let mut tree = self.lock();
        if !tree.dirs.contains(path) {
            return Err(not_found(path));
        }
        tree.files.retain(|p, _| !p.starts_with(path));
        tree.dirs.retain(|p| !p.starts_with(path));
        Ok(())
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let tree = self.lock();
        if !tree.dirs.contains(path) {
            return Err(not_found(path));
        }
        let children: BTreeSet<String> = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .filter(|p| p.parent() == Some(path))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        Ok(children.into_iter().collect())
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .lock()
            .files
            .keys()
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect())
    }
}
