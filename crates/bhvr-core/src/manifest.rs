//! Read-modify-write access to JSON manifests (`package.json`, `tsconfig.json`)
//!
//! Documents are held as [`serde_json::Value`] with insertion order kept, so
//! keys an installer does not touch come back out exactly where they were.

use crate::fs::ProjectFs;
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version ranges used when an installer declares a dependency
const DEPENDENCY_VERSIONS: &[(&str, &str)] = &[
    ("hono", "^4.7.11"),
    ("@tanstack/react-query", "^5.80.6"),
    ("@tanstack/react-query-devtools", "^5.80.6"),
    ("react-router", "^7.6.2"),
    ("@react-router/dev", "^7.6.2"),
    ("@react-router/node", "^7.6.2"),
    ("@react-router/serve", "^7.6.2"),
    ("isbot", "^5.1.28"),
    ("vite-tsconfig-paths", "^5.1.4"),
    ("@tanstack/react-router", "^1.121.0"),
    ("@tanstack/router-plugin", "^1.121.0"),
    ("tailwindcss", "^4.1.8"),
    ("@tailwindcss/vite", "^4.1.8"),
    ("tw-animate-css", "^1.3.4"),
    ("class-variance-authority", "^0.7.1"),
    ("clsx", "^2.1.1"),
    ("tailwind-merge", "^3.3.0"),
    ("lucide-react", "^0.513.0"),
    ("@radix-ui/react-slot", "^1.2.3"),
    ("@biomejs/biome", "^2.0.0"),
];

/// Pinned range for a known package, `latest` otherwise
pub fn version_of(package: &str) -> &'static str {
    DEPENDENCY_VERSIONS
        .iter()
        .find(|(name, _)| *name == package)
        .map(|(_, version)| *version)
        .unwrap_or("latest")
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf },
}

/// `package.json` dependency sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Prod,
    Dev,
}

impl DependencyKind {
    fn section(&self) -> &'static str {
        match self {
            DependencyKind::Prod => "dependencies",
            DependencyKind::Dev => "devDependencies",
        }
    }
}

/// A JSON object document loaded from the project
#[derive(Debug, Clone)]
pub struct JsonManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl JsonManifest {
    /// Load a manifest; `Ok(None)` when the file does not exist
    pub async fn load(fs: &dyn ProjectFs, path: &Path) -> Result<Option<Self>, ManifestError> {
        if !fs.exists(path).await {
            return Ok(None);
        }
        let bytes = fs.read(path).await.map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        match value {
            Value::Object(root) => Ok(Some(Self {
                path: path.to_path_buf(),
                root,
            })),
            _ => Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Write back with two-space indentation and a trailing newline
    pub async fn save(&self, fs: &dyn ProjectFs) -> Result<(), ManifestError> {
        let mut text = serde_json::to_string_pretty(&self.root).map_err(|source| {
            ManifestError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        text.push('\n');
        fs.write(&self.path, text.as_bytes())
            .await
            .map_err(|source| ManifestError::Write {
                path: self.path.clone(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.root.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.root.shift_remove(key)
    }

    /// Nested object under `key`, created (or replaced if not an object)
    pub fn object_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        let slot = self
            .root
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        }
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.root
            .get("scripts")
            .and_then(|s| s.get(name))
            .and_then(Value::as_str)
    }

    pub fn set_script(&mut self, name: &str, command: &str) {
        self.object_mut("scripts")
            .insert(name.to_string(), Value::String(command.to_string()));
    }

    pub fn remove_script(&mut self, name: &str) -> bool {
        match self.root.get_mut("scripts").and_then(Value::as_object_mut) {
            Some(scripts) => scripts.shift_remove(name).is_some(),
            None => false,
        }
    }

    pub fn has_dependency(&self, kind: DependencyKind, name: &str) -> bool {
        self.root
            .get(kind.section())
            .and_then(|d| d.get(name))
            .is_some()
    }

    /// Declare a dependency unless it is already declared in either section
    pub fn add_dependency(&mut self, kind: DependencyKind, name: &str) -> bool {
        if self.has_dependency(DependencyKind::Prod, name)
            || self.has_dependency(DependencyKind::Dev, name)
        {
            return false;
        }
        self.object_mut(kind.section())
            .insert(name.to_string(), Value::String(version_of(name).to_string()));
        true
    }

    /// Remove every dependency in `kind` whose name matches; returns the removed names
    pub fn remove_dependencies_where(
        &mut self,
        kind: DependencyKind,
        matches: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let Some(deps) = self
            .root
            .get_mut(kind.section())
            .and_then(Value::as_object_mut)
        else {
            return Vec::new();
        };
        let doomed: Vec<String> = deps.keys().filter(|k| matches(k)).cloned().collect();
        for name in &doomed {
            deps.shift_remove(name);
        }
        doomed
    }
}
