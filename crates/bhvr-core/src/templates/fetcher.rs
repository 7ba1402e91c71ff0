//! Base template acquisition from a GitHub archive or a local directory
//!
//! Remote sources are downloaded as the branch's zip archive and unpacked
//! with the archive's top-level directory stripped, like `degit` does.
//! Everything is written through [`ProjectFs`].

use crate::fs::ProjectFs;
use crate::options::validate_repository;
use crate::product::ProductConfig;
use anyhow::Context;
use async_trait::async_trait;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use url::Url;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Directories never copied from a local template
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];

/// Where the base template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// GitHub `<owner>/<name>` at a branch
    Remote { repo: String, branch: String },
    /// A directory on disk (for template development)
    Local(PathBuf),
}

impl TemplateSource {
    pub fn remote(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self::Remote {
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::Remote { repo, branch } => write!(f, "{}#{}", repo, branch),
            TemplateSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid repository '{0}': expected <owner>/<name>")]
    InvalidRepository(String),

    #[error("failed to download {url}: {source}")]
    Request { url: Url, source: reqwest::Error },

    #[error("failed to download {url}: HTTP {status}")]
    Status {
        url: Url,
        status: reqwest::StatusCode,
    },

    #[error("failed to unpack template archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("template source {0} contains no files")]
    Empty(String),

    #[error("failed to read template: {0:#}")]
    Read(anyhow::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Materializes a base template into an empty directory
#[async_trait]
pub trait TemplateFetcher: Send + Sync {
    /// Returns the number of files written
    async fn fetch(
        &self,
        source: &TemplateSource,
        dest: &Path,
        fs: &dyn ProjectFs,
    ) -> Result<usize, FetchError>;
}

/// [`TemplateFetcher`] using reqwest for archives and walkdir for local trees
pub struct HttpTemplateFetcher {
    client: reqwest::Client,
    archive_base: Url,
}

impl HttpTemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(archive_base: Url, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            archive_base,
        }
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> anyhow::Result<Self> {
        let base = Url::parse(config.archive_base_url())
            .with_context(|| format!("Invalid archive URL: {}", config.archive_base_url()))?;
        Ok(Self::new(base, config.user_agent()))
    }

    /// `<base>/<owner>/<repo>/zip/refs/heads/<branch>`
    pub fn archive_url(&self, repo: &str, branch: &str) -> Result<Url, FetchError> {
        validate_repository(repo).map_err(|_| FetchError::InvalidRepository(repo.to_string()))?;
        let mut url = self.archive_base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidRepository(repo.to_string()))?
            .pop_if_empty()
            .extend(repo.split('/'))
            .extend(["zip", "refs", "heads"])
            .extend(branch.split('/'));
        Ok(url)
    }

    async fn download(&self, repo: &str, branch: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.archive_url(repo, branch)?;
        tracing::info!(%url, "downloading template archive");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request { url, source })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TemplateFetcher for HttpTemplateFetcher {
    async fn fetch(
        &self,
        source: &TemplateSource,
        dest: &Path,
        fs: &dyn ProjectFs,
    ) -> Result<usize, FetchError> {
        let files = match source {
            TemplateSource::Remote { repo, branch } => {
                let bytes = self.download(repo, branch).await?;
                unpack_archive(&bytes)?
            }
            TemplateSource::Local(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || read_local_tree(&path))
                    .await
                    .map_err(|e| FetchError::Read(e.into()))?
                    .map_err(FetchError::Read)?
            }
        };

        if files.is_empty() {
            return Err(FetchError::Empty(source.to_string()));
        }
        write_files(fs, dest, files).await
    }
}

/// Files of a zip archive, with the single top-level directory stripped
pub fn unpack_archive(zip_bytes: &[u8]) -> Result<Vec<(PathBuf, Vec<u8>)>, FetchError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;
    let mut files = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        // Entries like `bhvr-main/client/package.json`; unsafe paths are dropped
        let Some(name) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "skipping unsafe archive entry");
            continue;
        };
        let relative: PathBuf = name
            .components()
            .skip(1)
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        if relative.as_os_str().is_empty() {
            continue;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| FetchError::Archive(e.into()))?;
        files.push((relative, contents));
    }

    Ok(files)
}

fn read_local_tree(root: &Path) -> anyhow::Result<Vec<(PathBuf, Vec<u8>)>> {
    if !root.is_dir() {
        anyhow::bail!("Template directory not found: {}", root.display());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && SKIPPED_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
        });

    for entry in walker {
        let entry = entry.context("Failed to walk template directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?.to_path_buf();
        let contents = std::fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        files.push((relative, contents));
    }

    Ok(files)
}

async fn write_files(
    fs: &dyn ProjectFs,
    dest: &Path,
    files: Vec<(PathBuf, Vec<u8>)>,
) -> Result<usize, FetchError> {
    let count = files.len();
    for (relative, contents) in files {
        let path = dest.join(relative);
        fs.write(&path, &contents)
            .await
            .map_err(|source| FetchError::Write { path, source })?;
    }
    tracing::debug!(files = count, dest = %dest.display(), "template written");
    Ok(count)
}
