//! Template acquisition and the variant store
//!
//! This module provides:
//! - [`TemplateStore`]: authored variants addressed by [`Slot`] and variant name
//! - [`slots`]: the slots installers fill
//! - [`TemplateFetcher`]: base template download from GitHub or a local directory
//! - [`check`]: store completeness against every reachable option set

pub mod check;
pub mod fetcher;
pub mod slots;
pub mod store;

use crate::installers::Registry;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub use check::{check_registry, check_slot, slot_combinations, CheckReport, MissingVariant};
pub use fetcher::{
    FetchError, HttpTemplateFetcher, TemplateFetcher, TemplateSource,
};
pub use store::{DirTemplateStore, Slot, StoreError, TemplateRef, TemplateStore};

/// Check the store under `extras_dir` and print a report.
///
/// Missing variants are listed as `touch` commands. Returns whether the
/// store is complete.
pub fn check_templates<C: ProductConfig>(config: &C, extras_dir: &Path) -> Result<bool> {
    if !extras_dir.is_dir() {
        anyhow::bail!("Template store not found: {}", extras_dir.display());
    }

    println!(
        "{}",
        format!("Checking {} template variants...", config.display_name())
            .cyan()
            .bold()
    );
    println!();

    let store = DirTemplateStore::new(extras_dir);
    let report = check_registry(&Registry::builtin(), &store, config.default_repo())
        .context("Failed to plan installers")?;

    if report.is_complete() {
        println!(
            "{} {} variant(s) across {} option set(s)",
            "All present:".green().bold(),
            report.checked,
            report.option_sets
        );
        return Ok(true);
    }

    for missing in &report.missing {
        eprintln!(
            "{} {} (needed by {})",
            "Missing:".yellow(),
            missing.reference,
            missing.installer
        );
    }
    println!();
    for missing in &report.missing {
        println!("touch {}", missing.path.display());
    }
    println!();
    println!(
        "{} {} of {} variant(s) missing in {}",
        "Incomplete:".red().bold(),
        report.missing.len(),
        report.checked,
        extras_dir.display()
    );

    Ok(false)
}
