//! External processes
//!
//! This module provides:
//! - A [`CommandRunner`] seam with a tokio implementation and bounded timeouts
//! - Package manager detection with bun, pnpm, npm fallback

pub mod package_manager;
pub mod process;

pub use package_manager::{install_dependencies, InstallDependenciesError, PackageManager};
pub use process::{CommandError, CommandRunner, TokioCommandRunner};
