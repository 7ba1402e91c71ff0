//! bhvr Core - Shared library for scaffolding bhvr monorepos
//!
//! This library turns a set of user choices into a working Bun + Hono +
//! Vite + React project: it clones a base template, then layers optional
//! features onto it through ordered, idempotent installers.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Option resolution, variant naming, the template
//!   store, manifest edits, subprocesses and template acquisition
//! - **Layer 2: Workflow Orchestration** - The installer registry and runner, the
//!   [`project::Assembler`] state machine and the [`ProductConfig`] seam
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use bhvr_core::prelude::*;
//!
//! let registry = Registry::builtin();
//! let assembler = Assembler {
//!     registry: &registry,
//!     fs: &RealFs,
//!     store: &DirTemplateStore::new(extras_dir),
//!     fetcher: &HttpTemplateFetcher::from_config(&config)?,
//!     runner: &TokioCommandRunner,
//! };
//! let generation = assembler
//!     .generate(request, &mut NonInteractive, &mut NoopObserver)
//!     .await?;
//! ```

pub mod fs;
pub mod installers;
pub mod manifest;
pub mod options;
pub mod product;
pub mod project;
pub mod prompt;
pub mod runtime;
pub mod templates;
pub mod testing;
pub mod variant;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use options::{ConfigError, Linter, OptionSet, PartialOptions, Router, Template};
pub use product::ProductConfig;
pub use project::{Assembler, Error, Generation, GenerationResult, Request};

#[cfg(feature = "tui")]
pub use tui::run;

/// Everything needed to drive a generation without the TUI
pub mod prelude {
    pub use crate::fs::{ProjectFs, RealFs};
    pub use crate::installers::{NoopObserver, Registry};
    pub use crate::options::{PartialOptions, Template};
    pub use crate::product::ProductConfig;
    pub use crate::project::{
        Assembler, AssemblyObserver, AssemblyState, Generation, GenerationResult, Request,
    };
    pub use crate::prompt::{NonInteractive, Prompter};
    pub use crate::runtime::TokioCommandRunner;
    pub use crate::templates::{DirTemplateStore, HttpTemplateFetcher};
}
