//! Template store: authored variant files addressed by slot and variant name
//!
//! Layout on disk is `<root>/<slot path>/<variant file name>`:
//!
//! ```text
//! extras/client/src/App.tsx/App-with-rpc-shadcn.tsx
//! extras/client/src/components/ClientOnly.tsx/ClientOnly.tsx
//! ```

use crate::options::{Feature, OptionSet, FEATURE_RULES};
use crate::variant::variant_name;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One output file position in the generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    path: &'static str,
}

impl Slot {
    /// `path` is relative to the project root, `/`-separated
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn file_name(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }

    /// Location of this slot below `root`
    pub fn under(&self, root: &Path) -> PathBuf {
        self.path
            .split('/')
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// A slot together with the variant that should fill it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateRef {
    pub slot: Slot,
    pub variant: String,
}

impl TemplateRef {
    /// A slot with a single authored version
    pub fn stable(slot: Slot) -> Self {
        Self {
            slot,
            variant: slot.file_name().to_string(),
        }
    }

    /// Variant for an explicit feature set, after dropping implied features
    pub fn with_features(slot: Slot, features: &BTreeSet<Feature>) -> Self {
        let reduced = FEATURE_RULES.reduce(features);
        Self {
            slot,
            variant: variant_name(slot.file_name(), reduced.iter().map(Feature::key)),
        }
    }

    /// Variant for the active subset of `relevant` in `options`
    pub fn for_options(slot: Slot, options: &OptionSet, relevant: &[Feature]) -> Self {
        let active: BTreeSet<Feature> = relevant
            .iter()
            .copied()
            .filter(|f| options.has(*f))
            .collect();
        Self::with_features(slot, &active)
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.slot, self.variant)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("template variant not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read template variant {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Read-only access to authored variants
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Pure path composition; no I/O
    fn variant_path(&self, slot: Slot, variant: &str) -> PathBuf;

    fn contains(&self, slot: Slot, variant: &str) -> bool;

    async fn read(&self, slot: Slot, variant: &str) -> Result<Vec<u8>, StoreError>;
}

/// Store rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DirTemplateStore {
    root: PathBuf,
}

impl DirTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TemplateStore for DirTemplateStore {
    fn variant_path(&self, slot: Slot, variant: &str) -> PathBuf {
        slot.under(&self.root).join(variant)
    }

    fn contains(&self, slot: Slot, variant: &str) -> bool {
        self.variant_path(slot, variant).is_file()
    }

    async fn read(&self, slot: Slot, variant: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.variant_path(slot, variant);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound { path }),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
