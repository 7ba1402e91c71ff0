//! Installers: named units that wire one optional feature into a project
//!
//! This module provides:
//! - The [`Installer`] trait and its declarative metadata
//! - [`InstallContext`], the explicit project root and collaborators an action runs against
//! - The built-in installers, assembled in declaration order by [`Registry::builtin`]
//! - Ordering ([`registry`]) and execution ([`runner`])

pub mod registry;
pub mod runner;

mod biome;
mod no_build;
mod react_router;
mod react_router_mpa;
mod rpc;
mod shadcn;
mod tailwind;
mod tanstack_query;
mod tanstack_router;

pub use registry::{InstallPlan, Registry, ResolveError};
pub use runner::{
    run_plan, InstallObserver, InstallOutcome, InstallReport, InstallStatus, NoopObserver,
};

use crate::fs::ProjectFs;
use crate::manifest::{DependencyKind, JsonManifest, ManifestError};
use crate::options::{Feature, OptionKey, OptionSet};
use crate::templates::{StoreError, TemplateRef, TemplateStore};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable installer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InstallerId(pub &'static str);

impl fmt::Display for InstallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How an option set relates to an installer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Runs in this generation
    Selected,
    /// Not run because the base template already carries the feature
    Provided,
    Inactive,
}

/// Activation of an installer wiring a feature the base template may already ship
fn feature_activation(options: &OptionSet, feature: Feature) -> Activation {
    if !options.has(feature) {
        Activation::Inactive
    } else if options.provided_by_template(feature) {
        Activation::Provided
    } else {
        Activation::Selected
    }
}

/// What an installer must not be combined with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    Installer(InstallerId),
    Option(OptionKey),
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Template(#[from] StoreError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("{} not found", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to update {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("project directory {} is not usable", .0.display())]
    ProjectRootUnavailable(PathBuf),

    #[error("'{installer}' requires '{requires}', which is not part of this run")]
    RequirementMissing {
        installer: InstallerId,
        requires: InstallerId,
    },
}

impl InstallError {
    /// Fatal failures abort the remaining installers
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InstallError::ProjectRootUnavailable(_) | InstallError::RequirementMissing { .. }
        )
    }
}

/// A unit that mutates the generated project for one feature.
///
/// Actions must be idempotent: running one twice leaves the same content
/// as running it once.
#[async_trait]
pub trait Installer: Send + Sync {
    fn id(&self) -> InstallerId;

    /// Human-readable name for progress output
    fn label(&self) -> &'static str;

    fn activation(&self, options: &OptionSet) -> Activation;

    /// Installers that must be selected (or provided) and run first
    fn requires(&self) -> &'static [InstallerId] {
        &[]
    }

    /// Installers that run first when both are selected
    fn after(&self) -> &'static [InstallerId] {
        &[]
    }

    fn conflicts(&self) -> &'static [Conflict] {
        &[]
    }

    /// Runs strictly after every other selected installer
    fn is_finalizer(&self) -> bool {
        false
    }

    /// Template variants this installer copies for `options`
    fn templates(&self, _options: &OptionSet) -> Vec<TemplateRef> {
        Vec::new()
    }

    async fn install(&self, ctx: &InstallContext<'_>) -> Result<(), InstallError>;
}

/// Everything an installer action may touch
pub struct InstallContext<'a> {
    pub root: &'a Path,
    pub options: &'a OptionSet,
    pub fs: &'a dyn ProjectFs,
    pub store: &'a dyn TemplateStore,
}

impl<'a> InstallContext<'a> {
    /// Absolute path of a `/`-separated project-relative path
    pub fn path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.root.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Copy a resolved variant into its slot, overwriting what is there
    pub async fn copy_template(&self, reference: &TemplateRef) -> Result<(), InstallError> {
        let contents = self.store.read(reference.slot, &reference.variant).await?;
        let target = reference.slot.under(self.root);
        tracing::debug!(variant = %reference.variant, target = %target.display(), "copy template");
        self.write(&target, &contents).await
    }

    pub async fn copy_templates(&self, references: &[TemplateRef]) -> Result<(), InstallError> {
        for reference in references {
            self.copy_template(reference).await?;
        }
        Ok(())
    }

    pub async fn read_to_string(&self, relative: &str) -> Result<Option<String>, InstallError> {
        let path = self.path(relative);
        if !self.fs.exists(&path).await {
            return Ok(None);
        }
        self.fs
            .read_to_string(&path)
            .await
            .map(Some)
            .map_err(|source| InstallError::Io { path, source })
    }

    pub async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), InstallError> {
        self.fs
            .write(path, contents)
            .await
            .map_err(|source| InstallError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    pub async fn write_str(&self, relative: &str, contents: &str) -> Result<(), InstallError> {
        self.write(&self.path(relative), contents.as_bytes()).await
    }

    /// Remove a file if present
    pub async fn remove_file(&self, relative: &str) -> Result<bool, InstallError> {
        let path = self.path(relative);
        if !self.fs.exists(&path).await {
            return Ok(false);
        }
        self.fs
            .remove_file(&path)
            .await
            .map(|_| true)
            .map_err(|source| InstallError::Io { path, source })
    }

    /// Remove a directory tree if present
    pub async fn remove_dir(&self, relative: &str) -> Result<bool, InstallError> {
        let path = self.path(relative);
        if !self.fs.is_dir(&path).await {
            return Ok(false);
        }
        self.fs
            .remove_dir_all(&path)
            .await
            .map(|_| true)
            .map_err(|source| InstallError::Io { path, source })
    }

    /// Load a JSON manifest that must exist
    pub async fn manifest(&self, relative: &str) -> Result<JsonManifest, InstallError> {
        let path = self.path(relative);
        JsonManifest::load(self.fs, &path)
            .await?
            .ok_or(InstallError::MissingFile(path))
    }

    /// Load a JSON manifest if it exists
    pub async fn manifest_if_exists(
        &self,
        relative: &str,
    ) -> Result<Option<JsonManifest>, InstallError> {
        Ok(JsonManifest::load(self.fs, &self.path(relative)).await?)
    }

    /// Declare dependencies in a workspace package's `package.json`
    pub async fn add_dependencies(
        &self,
        package_dir: &str,
        kind: DependencyKind,
        packages: &[&str],
    ) -> Result<(), InstallError> {
        let relative = if package_dir.is_empty() {
            "package.json".to_string()
        } else {
            format!("{}/package.json", package_dir)
        };
        let mut manifest = self.manifest(&relative).await?;
        let mut changed = false;
        for package in packages {
            changed |= manifest.add_dependency(kind, package);
        }
        if changed {
            manifest.save(self.fs).await?;
        }
        Ok(())
    }
}

/// Run `installer` twice on the base project fixture and check the second
/// run changes nothing. Returns the project after the first run.
#[cfg(test)]
pub(crate) async fn apply_twice(
    installer: &dyn Installer,
    options: &OptionSet,
) -> crate::fs::MemoryFs {
    use crate::testing::{base_project_fs, MemoryStore, PROJECT_ROOT};

    let fs = base_project_fs();
    let store = MemoryStore::new();
    store.stock(installer, options);
    let ctx = InstallContext {
        root: Path::new(PROJECT_ROOT),
        options,
        fs: &fs,
        store: &store,
    };

    installer.install(&ctx).await.unwrap();
    let first = fs.snapshot();
    installer.install(&ctx).await.unwrap();
    assert_eq!(fs.snapshot(), first, "{} is not idempotent", installer.id());
    fs
}
