//! Resolution of partial options into an [`OptionSet`]

use super::{ConfigError, Feature, Linter, OptionSet, Router, Template, FEATURE_RULES};
use crate::prompt::{Choice, PromptError, Prompter};
use std::collections::BTreeSet;
use thiserror::Error;

/// Project name used when none is given
pub const DEFAULT_PROJECT_NAME: &str = "my-bhvr-app";

/// Why option resolution stopped
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Option values collected from flags; `None` means "not decided yet"
#[derive(Debug, Clone, Default)]
pub struct PartialOptions {
    pub project_name: Option<String>,
    pub template: Option<Template>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub tailwind: Option<bool>,
    pub shadcn: Option<bool>,
    pub rpc: Option<bool>,
    pub tanstack_query: Option<bool>,
    pub router: Option<Router>,
    pub linter: Option<Linter>,
    pub no_build: Option<bool>,
}

impl PartialOptions {
    /// Ask for every unset value, in a fixed order:
    /// name, template, optional features, router, linter, build mode.
    pub fn resolve<P: Prompter>(
        mut self,
        prompter: &mut P,
        default_repo: &str,
    ) -> Result<OptionSet, OptionsError> {
        if self.project_name.is_none() {
            let name = prompter.input("What is the name of your project?", DEFAULT_PROJECT_NAME)?;
            validate_project_name(name.trim())?;
            self.project_name = Some(name);
        }

        if self.template.is_none() {
            let choices: Vec<Choice<Template>> = Template::ALL
                .iter()
                .map(|t| Choice::new(*t, t.name(), t.description()))
                .collect();
            self.template = Some(prompter.select(
                "Select a template",
                &choices,
                &Template::Default,
            )?);
        }

        let mut toggles = Vec::new();
        if self.rpc.is_none() {
            toggles.push(Choice::new(
                Feature::Rpc,
                "Hono RPC client",
                "type-safe API calls from the client",
            ));
        }
        if self.tanstack_query.is_none() {
            toggles.push(Choice::new(
                Feature::TanstackQuery,
                "TanStack Query",
                "data fetching and caching",
            ));
        }
        if !toggles.is_empty() {
            let picked = prompter.multiselect("Add optional features", &toggles, &[])?;
            for choice in &toggles {
                let on = picked.contains(&choice.value);
                match choice.value {
                    Feature::Rpc => self.rpc = Some(on),
                    Feature::TanstackQuery => self.tanstack_query = Some(on),
                    _ => {}
                }
            }
        }

        if self.router.is_none() {
            let choices: Vec<Choice<Router>> = Router::ALL
                .iter()
                .map(|r| Choice::new(*r, r.label(), ""))
                .collect();
            self.router = Some(prompter.select("Select a router", &choices, &Router::None)?);
        }

        if self.linter.is_none() {
            let choices: Vec<Choice<Linter>> = Linter::ALL
                .iter()
                .map(|l| Choice::new(*l, l.label(), ""))
                .collect();
            self.linter = Some(prompter.select("Select a linter", &choices, &Linter::Eslint)?);
        }

        if self.no_build.is_none() {
            let choices = [
                Choice::new(false, "Build packages", "shared and server compile to dist/"),
                Choice::new(true, "No build", "import TypeScript sources directly"),
            ];
            self.no_build = Some(prompter.select("Select a build mode", &choices, &false)?);
        }

        Ok(self.finish(default_repo)?)
    }

    /// Fill every unset value with its default. Never prompts.
    pub fn resolve_defaults(self, default_repo: &str) -> Result<OptionSet, ConfigError> {
        self.finish(default_repo)
    }

    fn finish(self, default_repo: &str) -> Result<OptionSet, ConfigError> {
        let project_name = self
            .project_name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
        validate_project_name(&project_name)?;

        let repo = self.repo.unwrap_or_else(|| default_repo.to_string());
        validate_repository(&repo)?;

        let branch = self
            .branch
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        let template = self.template.unwrap_or(Template::Default);
        let router = self.router.unwrap_or_default();

        let mut active = BTreeSet::new();
        let mut forced_off = BTreeSet::new();
        for (feature, value) in [
            (Feature::Tailwind, self.tailwind),
            (Feature::Shadcn, self.shadcn),
            (Feature::Rpc, self.rpc),
            (Feature::TanstackQuery, self.tanstack_query),
        ] {
            match value {
                Some(true) => {
                    active.insert(feature);
                }
                Some(false) => {
                    forced_off.insert(feature);
                }
                None => {}
            }
        }

        for feature in template.provides() {
            if forced_off.contains(feature) {
                return Err(ConfigError::TemplateConflict {
                    template,
                    feature: *feature,
                });
            }
            active.insert(*feature);
        }
        if let Some(feature) = router.feature() {
            active.insert(feature);
        }

        for feature in FEATURE_RULES.normalize(&mut active, &forced_off)? {
            tracing::info!(feature = %feature, "enabled because a selected feature requires it");
        }

        Ok(OptionSet {
            project_name,
            template,
            repo,
            branch,
            tailwind: active.contains(&Feature::Tailwind),
            shadcn: active.contains(&Feature::Shadcn),
            rpc: active.contains(&Feature::Rpc),
            tanstack_query: active.contains(&Feature::TanstackQuery),
            router,
            linter: self.linter.unwrap_or_default(),
            no_build: self.no_build.unwrap_or(false),
        })
    }
}

/// A project name becomes a single directory under the base directory
pub fn validate_project_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must name a new directory")
    } else if name.contains('/') || name.contains('\\') {
        Some("must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidProjectName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Repositories are GitHub `<owner>/<name>` references
pub fn validate_repository(repo: &str) -> Result<(), ConfigError> {
    let valid = repo.split_once('/').is_some_and(|(owner, name)| {
        !owner.is_empty()
            && !name.is_empty()
            && owner
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    });

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidRepository(repo.to_string()))
    }
}
