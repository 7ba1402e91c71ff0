//! Package manager detection and dependency installation

use super::process::{CommandError, CommandRunner, COMMAND_TIMEOUT, INSTALL_TIMEOUT};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Bun,
    Pnpm,
    Npm,
}

/// Package managers in order of preference
pub const PACKAGE_MANAGERS: [PackageManager; 3] =
    [PackageManager::Bun, PackageManager::Pnpm, PackageManager::Npm];

impl PackageManager {
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Bun => "bun",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Npm => "npm",
        }
    }

    /// Command that starts the dev servers in the generated project
    pub fn run_dev(&self) -> &'static str {
        match self {
            PackageManager::Bun => "bun run dev",
            PackageManager::Pnpm => "pnpm dev",
            PackageManager::Npm => "npm run dev",
        }
    }

    pub async fn is_available(&self, runner: &dyn CommandRunner, cwd: &Path) -> bool {
        runner
            .run(self.binary(), &["--version"], cwd, COMMAND_TIMEOUT)
            .await
            .is_ok()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary())
    }
}

#[derive(Debug, Error)]
pub enum InstallDependenciesError {
    #[error("no package manager found (tried bun, pnpm, npm)")]
    NoPackageManager,

    #[error("{manager} install failed: {source}")]
    Failed {
        manager: PackageManager,
        source: CommandError,
    },
}

/// Install dependencies with the first available package manager.
///
/// A manager that is present but fails hands over to the next one; the last
/// failure is returned when none succeeds.
pub async fn install_dependencies(
    runner: &dyn CommandRunner,
    project_dir: &Path,
) -> Result<PackageManager, InstallDependenciesError> {
    let mut last_failure = None;

    for manager in PACKAGE_MANAGERS {
        if !manager.is_available(runner, project_dir).await {
            tracing::debug!(%manager, "package manager not available");
            continue;
        }

        match runner
            .run(manager.binary(), &["install"], project_dir, INSTALL_TIMEOUT)
            .await
        {
            Ok(()) => {
                tracing::info!(%manager, "dependencies installed");
                return Ok(manager);
            }
            Err(source) => {
                tracing::warn!(%manager, error = %source, "dependency installation failed");
                last_failure = Some(InstallDependenciesError::Failed { manager, source });
            }
        }
    }

    Err(last_failure.unwrap_or(InstallDependenciesError::NoPackageManager))
}
