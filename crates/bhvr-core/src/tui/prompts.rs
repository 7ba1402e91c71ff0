//! Charm-style CLI flow using cliclack

use super::clack::{ClackPrompter, SpinnerObserver};
use crate::fs::RealFs;
use crate::installers::Registry;
use crate::options::PartialOptions;
use crate::product::ProductConfig;
use crate::project::{Assembler, Generation, GenerationResult, Request, CANCELLED};
use crate::prompt::NonInteractive;
use crate::runtime::TokioCommandRunner;
use crate::templates::{DirTemplateStore, HttpTemplateFetcher};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Choices given as flags; the rest are prompted for
    pub options: PartialOptions,

    /// Local directory to copy the base template from instead of downloading it
    pub template_dir: Option<PathBuf>,

    /// Template store root overriding the configured one
    pub extras_dir: Option<PathBuf>,

    /// `Some(false)` skips git initialization without asking
    pub git: Option<bool>,

    /// `Some(false)` skips dependency installation without asking
    pub install: Option<bool>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<()> {
    cliclack::intro(format!(" {} ", config.display_name()).on_cyan().black().to_string())?;

    let mut options = args.options;
    options.repo = Some(config.repo(options.repo));
    if args.yes && options.project_name.is_none() {
        options.project_name = Some(config.default_project_name().to_string());
    }

    let extras_dir = config.extras_dir(args.extras_dir);
    if !extras_dir.is_dir() {
        cliclack::log::warning(format!(
            "Template store not found at {}; feature templates will be unavailable",
            extras_dir.display()
        ))?;
    }
    tracing::debug!(extras_dir = %extras_dir.display(), "template store");

    let request = Request {
        options,
        base_dir: std::env::current_dir().context("Failed to read the current directory")?,
        default_repo: config.default_repo().to_string(),
        template_dir: args.template_dir,
        git: args.git,
        install: args.install,
    };

    let registry = Registry::builtin();
    let store = DirTemplateStore::new(&extras_dir);
    let fetcher = HttpTemplateFetcher::from_config(config)?;
    let assembler = Assembler {
        registry: &registry,
        fs: &RealFs,
        store: &store,
        fetcher: &fetcher,
        runner: &TokioCommandRunner,
    };

    let mut observer = SpinnerObserver::default();
    let generation = if args.yes {
        assembler
            .generate(request, &mut NonInteractive, &mut observer)
            .await
    } else {
        assembler
            .generate(request, &mut ClackPrompter, &mut observer)
            .await
    };
    let generation = generation.context("Project creation failed")?;

    match generation {
        Generation::Cancelled { state } => {
            tracing::debug!(%state, "stopped before completion");
            cliclack::outro_cancel(CANCELLED)?;
        }
        Generation::Done(result) => {
            summarize(&result)?;
            print_next_steps(config, &result.project_dir, &result)?;
        }
    }

    Ok(())
}

fn summarize(result: &GenerationResult) -> Result<()> {
    let applied: Vec<&str> = result
        .installers
        .outcomes()
        .iter()
        .filter(|outcome| outcome.is_applied())
        .map(|outcome| outcome.label)
        .collect();
    if !applied.is_empty() {
        cliclack::log::success(format!("Added: {}", applied.join(", ")))?;
    }

    cliclack::log::success(format!(
        "Project {} created in {}",
        result.project_name.bold(),
        result.project_dir.display()
    ))?;

    if !result.warnings.is_empty() {
        cliclack::log::warning(format!(
            "Completed with {} warning(s)",
            result.warnings.len()
        ))?;
    }
    Ok(())
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    project_dir: &Path,
    result: &GenerationResult,
) -> Result<()> {
    let steps = config.next_steps(project_dir, result);

    println!();
    println!("  {}", "Next steps".bold());
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }
    println!();
    println!("  Docs: {}", config.docs_url().underline());

    cliclack::outro("Happy hacking!")?;

    Ok(())
}
