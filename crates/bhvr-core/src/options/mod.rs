//! Option model for one generation request
//!
//! This module provides:
//! - Closed choices ([`Template`], [`Router`], [`Linter`])
//! - [`Feature`], the option names that take part in template variant naming
//! - [`OptionSet`], the resolved and immutable configuration
//! - [`PartialOptions`], possibly-unset values resolved via prompts or defaults

mod resolve;
mod rules;

pub use resolve::{
    validate_project_name, validate_repository, OptionsError, PartialOptions, DEFAULT_PROJECT_NAME,
};
pub use rules::{Rules, FEATURE_RULES};

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Base template the project is cloned from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Default,
    Tailwind,
    Shadcn,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Default, Template::Tailwind, Template::Shadcn];

    pub fn name(&self) -> &'static str {
        match self {
            Template::Default => "default",
            Template::Tailwind => "tailwind",
            Template::Shadcn => "shadcn",
        }
    }

    /// Branch of the template repository holding this base
    pub fn branch(&self) -> &'static str {
        match self {
            Template::Default => "main",
            Template::Tailwind => "tailwindcss",
            Template::Shadcn => "shadcn-ui",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::Default => "Basic setup with Bun, Hono, Vite and React",
            Template::Tailwind => "Basic setup + TailwindCSS",
            Template::Shadcn => "Basic setup + TailwindCSS + shadcn/ui",
        }
    }

    /// Features already wired into this base, which need no installer
    pub fn provides(&self) -> &'static [Feature] {
        match self {
            Template::Default => &[],
            Template::Tailwind => &[Feature::Tailwind],
            Template::Shadcn => &[Feature::Tailwind, Feature::Shadcn],
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Client-side routing choice
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Router {
    #[default]
    None,
    #[value(name = "reactrouter")]
    ReactRouter,
    #[value(name = "reactroutermpa")]
    ReactRouterMpa,
    #[value(name = "tanstackrouter")]
    TanstackRouter,
}

impl Router {
    pub const ALL: [Router; 4] = [
        Router::None,
        Router::ReactRouter,
        Router::ReactRouterMpa,
        Router::TanstackRouter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Router::None => "none",
            Router::ReactRouter => "reactrouter",
            Router::ReactRouterMpa => "reactroutermpa",
            Router::TanstackRouter => "tanstackrouter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Router::None => "None",
            Router::ReactRouter => "React Router",
            Router::ReactRouterMpa => "React Router (framework mode, SSR)",
            Router::TanstackRouter => "TanStack Router",
        }
    }

    /// The variant-naming feature this choice activates
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Router::None => None,
            Router::ReactRouter => Some(Feature::ReactRouter),
            Router::ReactRouterMpa => Some(Feature::ReactRouterMpa),
            Router::TanstackRouter => Some(Feature::TanstackRouter),
        }
    }
}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Linter wired into the generated project
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Linter {
    #[default]
    Eslint,
    Biome,
}

impl Linter {
    pub const ALL: [Linter; 2] = [Linter::Eslint, Linter::Biome];

    pub fn name(&self) -> &'static str {
        match self {
            Linter::Eslint => "eslint",
            Linter::Biome => "biome",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Linter::Eslint => "ESLint (default)",
            Linter::Biome => "Biome",
        }
    }
}

impl fmt::Display for Linter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An option that participates in template variant names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Feature {
    Tailwind,
    Shadcn,
    Rpc,
    TanstackQuery,
    ReactRouter,
    ReactRouterMpa,
    TanstackRouter,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Tailwind,
        Feature::Shadcn,
        Feature::Rpc,
        Feature::TanstackQuery,
        Feature::ReactRouter,
        Feature::ReactRouterMpa,
        Feature::TanstackRouter,
    ];

    /// Option key, as it appears in configuration and (lowercased) in variant names
    pub fn key(&self) -> &'static str {
        match self {
            Feature::Tailwind => "tailwind",
            Feature::Shadcn => "shadcn",
            Feature::Rpc => "rpc",
            Feature::TanstackQuery => "tanstackQuery",
            Feature::ReactRouter => "reactRouter",
            Feature::ReactRouterMpa => "reactRouterMpa",
            Feature::TanstackRouter => "tanstackRouter",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Anything an installer can declare a conflict with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    Feature(Feature),
    Linter(Linter),
    NoBuild,
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKey::Feature(feature) => write!(f, "{}", feature),
            OptionKey::Linter(linter) => write!(f, "linter={}", linter),
            OptionKey::NoBuild => write!(f, "noBuild"),
        }
    }
}

/// Validation failures while resolving options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("'{feature}' requires '{requires}', but '{requires}' was explicitly disabled")]
    MissingRequirement { feature: Feature, requires: Feature },

    #[error("only one of {} may be active at a time", join_features(.active))]
    Exclusive { active: Vec<Feature> },

    #[error("the '{template}' template already includes '{feature}', which was explicitly disabled")]
    TemplateConflict { template: Template, feature: Feature },

    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: &'static str },

    #[error("invalid repository '{0}': expected <owner>/<name>")]
    InvalidRepository(String),
}

fn join_features(features: &[Feature]) -> String {
    features
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fully resolved configuration for one generation run
///
/// Only produced by [`PartialOptions`] resolution, so every value
/// satisfies [`FEATURE_RULES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSet {
    project_name: String,
    template: Template,
    repo: String,
    branch: Option<String>,
    tailwind: bool,
    shadcn: bool,
    rpc: bool,
    tanstack_query: bool,
    router: Router,
    linter: Linter,
    no_build: bool,
}

impl OptionSet {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Branch to fetch: the explicit override, else the template's branch
    pub fn branch(&self) -> &str {
        self.branch
            .as_deref()
            .unwrap_or_else(|| self.template.branch())
    }

    pub fn tailwind(&self) -> bool {
        self.tailwind
    }

    pub fn shadcn(&self) -> bool {
        self.shadcn
    }

    pub fn rpc(&self) -> bool {
        self.rpc
    }

    pub fn tanstack_query(&self) -> bool {
        self.tanstack_query
    }

    pub fn router(&self) -> Router {
        self.router
    }

    pub fn linter(&self) -> Linter {
        self.linter
    }

    pub fn no_build(&self) -> bool {
        self.no_build
    }

    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Tailwind => self.tailwind,
            Feature::Shadcn => self.shadcn,
            Feature::Rpc => self.rpc,
            Feature::TanstackQuery => self.tanstack_query,
            other => self.router.feature() == Some(other),
        }
    }

    /// Every active variant-naming feature
    pub fn features(&self) -> BTreeSet<Feature> {
        Feature::ALL.into_iter().filter(|f| self.has(*f)).collect()
    }

    pub fn is_active(&self, key: OptionKey) -> bool {
        match key {
            OptionKey::Feature(feature) => self.has(feature),
            OptionKey::Linter(linter) => self.linter == linter,
            OptionKey::NoBuild => self.no_build,
        }
    }

    /// Whether the base template already ships this feature
    pub fn provided_by_template(&self, feature: Feature) -> bool {
        self.template.provides().contains(&feature)
    }

    /// Every option set the resolver can produce for one project name
    pub fn reachable(project_name: &str, repo: &str) -> Vec<OptionSet> {
        const BOOLS: [bool; 2] = [false, true];
        let mut sets: Vec<OptionSet> = Vec::new();

        for template in Template::ALL {
            for tailwind in BOOLS {
                for shadcn in BOOLS {
                    for rpc in BOOLS {
                        for tanstack_query in BOOLS {
                            for router in Router::ALL {
                                for linter in Linter::ALL {
                                    for no_build in BOOLS {
                                        let partial = PartialOptions {
                                            project_name: Some(project_name.to_string()),
                                            template: Some(template),
                                            repo: Some(repo.to_string()),
                                            branch: None,
                                            tailwind: Some(tailwind),
                                            shadcn: Some(shadcn),
                                            rpc: Some(rpc),
                                            tanstack_query: Some(tanstack_query),
                                            router: Some(router),
                                            linter: Some(linter),
                                            no_build: Some(no_build),
                                        };
                                        if let Ok(set) = partial.resolve_defaults(repo) {
                                            if !sets.contains(&set) {
                                                sets.push(set);
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(partial: PartialOptions) -> OptionSet {
        partial.resolve_defaults("stevedylandev/bhvr").unwrap()
    }

    #[test]
    fn test_template_branches() {
        assert_eq!(Template::Default.branch(), "main");
        assert_eq!(Template::Tailwind.branch(), "tailwindcss");
        assert_eq!(Template::Shadcn.branch(), "shadcn-ui");
    }

    #[test]
    fn test_branch_override_wins() {
        let set = resolved(PartialOptions {
            template: Some(Template::Tailwind),
            branch: Some("canary".to_string()),
            ..Default::default()
        });
        assert_eq!(set.branch(), "canary");
        assert_eq!(set.template(), Template::Tailwind);
    }

    #[test]
    fn test_features_include_router() {
        let set = resolved(PartialOptions {
            rpc: Some(true),
            router: Some(Router::TanstackRouter),
            ..Default::default()
        });
        let features: Vec<_> = set.features().into_iter().collect();
        assert_eq!(features, vec![Feature::Rpc, Feature::TanstackRouter]);
        assert!(set.is_active(OptionKey::Feature(Feature::TanstackRouter)));
        assert!(!set.is_active(OptionKey::Feature(Feature::ReactRouter)));
    }

    #[test]
    fn test_is_active_linter_and_no_build() {
        let set = resolved(PartialOptions {
            linter: Some(Linter::Biome),
            no_build: Some(true),
            ..Default::default()
        });
        assert!(set.is_active(OptionKey::Linter(Linter::Biome)));
        assert!(!set.is_active(OptionKey::Linter(Linter::Eslint)));
        assert!(set.is_active(OptionKey::NoBuild));
    }

    #[test]
    fn test_reachable_sets_satisfy_rules() {
        let sets = OptionSet::reachable("app", "stevedylandev/bhvr");
        assert!(!sets.is_empty());
        for set in &sets {
            assert!(FEATURE_RULES.is_reachable(&set.features()), "{:?}", set);
            for feature in set.template().provides() {
                assert!(set.has(*feature));
            }
        }
        // shadcn never appears without tailwind
        assert!(sets.iter().all(|s| !s.shadcn() || s.tailwind()));
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::Exclusive {
            active: vec![Feature::ReactRouter, Feature::TanstackRouter],
        };
        assert_eq!(
            err.to_string(),
            "only one of reactRouter, tanstackRouter may be active at a time"
        );
    }
}
