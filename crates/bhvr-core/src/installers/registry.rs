//! Installer selection and ordering
//!
//! The registry is a fixed list of installers in declaration order.
//! Planning an option set:
//! - selects every installer whose [`Activation`] is `Selected`
//! - checks `requires` edges (target selected or provided) and conflicts
//! - topologically sorts the selection (Kahn), breaking ties by declaration order
//! - appends the finalizer, if one is selected

use super::{
    biome::Biome, no_build::NoBuild, react_router::ReactRouter,
    react_router_mpa::ReactRouterMpa, rpc::Rpc, shadcn::Shadcn, tailwind::Tailwind,
    tanstack_query::TanstackQuery, tanstack_router::TanstackRouter, Activation, Conflict,
    Installer, InstallerId,
};
use crate::options::{OptionKey, OptionSet};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("installer '{installer}' references unknown installer '{unknown}'")]
    UnknownInstaller {
        installer: InstallerId,
        unknown: InstallerId,
    },

    #[error("installer '{installer}' requires '{requires}', which is not selected")]
    MissingDependency {
        installer: InstallerId,
        requires: InstallerId,
    },

    #[error("installers '{installer}' and '{other}' cannot be used together")]
    Conflict {
        installer: InstallerId,
        other: InstallerId,
    },

    #[error("installer '{installer}' cannot be used with option '{option}'")]
    OptionConflict {
        installer: InstallerId,
        option: OptionKey,
    },

    #[error("more than one finalizing installer selected: {}", join_ids(.0))]
    MultipleFinalizers(Vec<InstallerId>),

    #[error("installer '{installer}' depends on finalizer '{finalizer}'")]
    FinalizerDependency {
        installer: InstallerId,
        finalizer: InstallerId,
    },

    #[error("installer ordering cycle between: {}", join_ids(.0))]
    Cycle(Vec<InstallerId>),
}

fn join_ids(ids: &[InstallerId]) -> String {
    ids.iter().map(|i| i.0).collect::<Vec<_>>().join(", ")
}

/// Ordered installers for one option set
pub struct InstallPlan<'r> {
    steps: Vec<&'r dyn Installer>,
    provided: BTreeSet<InstallerId>,
}

impl<'r> InstallPlan<'r> {
    pub fn steps(&self) -> &[&'r dyn Installer] {
        &self.steps
    }

    pub fn ids(&self) -> Vec<InstallerId> {
        self.steps.iter().map(|i| i.id()).collect()
    }

    /// Installers whose feature the base template already carries
    pub fn is_provided(&self, id: InstallerId) -> bool {
        self.provided.contains(&id)
    }

    pub fn contains(&self, id: InstallerId) -> bool {
        self.steps.iter().any(|i| i.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Statically declared installer list
pub struct Registry {
    installers: Vec<Box<dyn Installer>>,
}

impl Registry {
    pub fn new(installers: Vec<Box<dyn Installer>>) -> Self {
        Self { installers }
    }

    /// The built-in installers, in declaration order
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(Tailwind),
            Box::new(Shadcn),
            Box::new(Rpc),
            Box::new(TanstackQuery),
            Box::new(ReactRouter),
            Box::new(ReactRouterMpa),
            Box::new(TanstackRouter),
            Box::new(Biome),
            Box::new(NoBuild),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Installer> {
        self.installers.iter().map(|i| i.as_ref())
    }

    pub fn get(&self, id: InstallerId) -> Option<&dyn Installer> {
        self.iter().find(|i| i.id() == id)
    }

    fn index_of(&self, id: InstallerId) -> Option<usize> {
        self.installers.iter().position(|i| i.id() == id)
    }

    /// Select and order installers for `options`. Pure: touches nothing.
    pub fn plan(&self, options: &OptionSet) -> Result<InstallPlan<'_>, ResolveError> {
        let activation: Vec<Activation> =
            self.installers.iter().map(|i| i.activation(options)).collect();
        let selected: Vec<usize> = (0..self.installers.len())
            .filter(|&i| activation[i] == Activation::Selected)
            .collect();
        let is_selected = |idx: usize| activation[idx] == Activation::Selected;

        // Edge `before -> after`; keyed by declaration index
        let mut edges: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();

        for &idx in &selected {
            let installer = self.installers[idx].as_ref();

            for &req in installer.requires() {
                let target = self.index_of(req).ok_or(ResolveError::UnknownInstaller {
                    installer: installer.id(),
                    unknown: req,
                })?;
                match activation[target] {
                    Activation::Selected => {
                        edges.entry(target).or_default().insert(idx);
                    }
                    Activation::Provided => {}
                    Activation::Inactive => {
                        return Err(ResolveError::MissingDependency {
                            installer: installer.id(),
                            requires: req,
                        })
                    }
                }
            }

            for &prior in installer.after() {
                let target = self.index_of(prior).ok_or(ResolveError::UnknownInstaller {
                    installer: installer.id(),
                    unknown: prior,
                })?;
                if is_selected(target) {
                    edges.entry(target).or_default().insert(idx);
                }
            }

            for conflict in installer.conflicts() {
                match *conflict {
                    Conflict::Installer(other) => {
                        let target = self.index_of(other).ok_or(ResolveError::UnknownInstaller {
                            installer: installer.id(),
                            unknown: other,
                        })?;
                        if is_selected(target) {
                            return Err(ResolveError::Conflict {
                                installer: installer.id(),
                                other,
                            });
                        }
                    }
                    Conflict::Option(key) => {
                        if options.is_active(key) {
                            return Err(ResolveError::OptionConflict {
                                installer: installer.id(),
                                option: key,
                            });
                        }
                    }
                }
            }
        }

        let finalizers: Vec<usize> = selected
            .iter()
            .copied()
            .filter(|&i| self.installers[i].is_finalizer())
            .collect();
        if finalizers.len() > 1 {
            return Err(ResolveError::MultipleFinalizers(
                finalizers.iter().map(|&i| self.installers[i].id()).collect(),
            ));
        }
        if let Some(&finalizer) = finalizers.first() {
            if let Some(dependents) = edges.get(&finalizer) {
                if let Some(&dependent) = dependents.iter().next() {
                    return Err(ResolveError::FinalizerDependency {
                        installer: self.installers[dependent].id(),
                        finalizer: self.installers[finalizer].id(),
                    });
                }
            }
        }

        let body: Vec<usize> = selected
            .iter()
            .copied()
            .filter(|i| !finalizers.contains(i))
            .collect();
        let mut order = self.topological_order(&body, &edges)?;
        order.extend(finalizers);

        let provided = (0..self.installers.len())
            .filter(|&i| activation[i] == Activation::Provided)
            .map(|i| self.installers[i].id())
            .collect();

        let plan = InstallPlan {
            steps: order.into_iter().map(|i| self.installers[i].as_ref()).collect(),
            provided,
        };
        tracing::debug!(order = %join_ids(&plan.ids()), "installer plan");
        Ok(plan)
    }

    /// Kahn's algorithm; the ready set is ordered by declaration index
    fn topological_order(
        &self,
        nodes: &[usize],
        edges: &BTreeMap<usize, BTreeSet<usize>>,
    ) -> Result<Vec<usize>, ResolveError> {
        let members: BTreeSet<usize> = nodes.iter().copied().collect();
        let mut in_degree: BTreeMap<usize, usize> = members.iter().map(|&n| (n, 0)).collect();
        for (from, targets) in edges {
            if !members.contains(from) {
                continue;
            }
            for to in targets {
                if let Some(degree) = in_degree.get_mut(to) {
                    *degree += 1;
                }
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .filter(|&(_, &d)| d == 0)
            .map(|(&n, _)| n)
            .collect();
        let mut order = Vec::with_capacity(members.len());

        while let Some(current) = ready.pop_first() {
            order.push(current);
            for next in edges.get(&current).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*next);
                    }
                }
            }
        }

        if order.len() != members.len() {
            let stuck = in_degree
                .iter()
                .filter(|&(n, &d)| d > 0 && !order.contains(n))
                .map(|(&n, _)| self.installers[n].id())
                .collect();
            return Err(ResolveError::Cycle(stuck));
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installers::{InstallContext, InstallError};
    use crate::options::{Linter, PartialOptions, Router, Template};
    use async_trait::async_trait;
    use proptest::prelude::*;

    const REPO: &str = "stevedylandev/bhvr";

    fn options(partial: PartialOptions) -> OptionSet {
        partial.resolve_defaults(REPO).unwrap()
    }

    fn names(plan: &InstallPlan<'_>) -> Vec<&'static str> {
        plan.ids().into_iter().map(|i| i.0).collect()
    }

    struct Fake {
        id: &'static str,
        on: bool,
        requires: &'static [InstallerId],
        after: &'static [InstallerId],
        conflicts: &'static [Conflict],
        finalizer: bool,
    }

    impl Fake {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                on: true,
                requires: &[],
                after: &[],
                conflicts: &[],
                finalizer: false,
            }
        }
    }

    #[async_trait]
    impl Installer for Fake {
        fn id(&self) -> InstallerId {
            InstallerId(self.id)
        }
        fn label(&self) -> &'static str {
            self.id
        }
        fn activation(&self, _options: &OptionSet) -> Activation {
            if self.on {
                Activation::Selected
            } else {
                Activation::Inactive
            }
        }
        fn requires(&self) -> &'static [InstallerId] {
            self.requires
        }
        fn after(&self) -> &'static [InstallerId] {
            self.after
        }
        fn conflicts(&self) -> &'static [Conflict] {
            self.conflicts
        }
        fn is_finalizer(&self) -> bool {
            self.finalizer
        }
        async fn install(&self, _ctx: &InstallContext<'_>) -> Result<(), InstallError> {
            Ok(())
        }
    }

    #[test]
    fn test_shadcn_template_with_rpc_runs_only_rpc() {
        let registry = Registry::builtin();
        let set = options(PartialOptions {
            template: Some(Template::Shadcn),
            rpc: Some(true),
            ..Default::default()
        });
        let plan = registry.plan(&set).unwrap();
        assert_eq!(names(&plan), vec!["rpc"]);
        assert!(plan.is_provided(InstallerId("tailwind")));
        assert!(plan.is_provided(InstallerId("shadcn")));
    }

    #[test]
    fn test_styling_installers_on_default_template() {
        let registry = Registry::builtin();
        let set = options(PartialOptions {
            shadcn: Some(true),
            rpc: Some(true),
            tanstack_query: Some(true),
            ..Default::default()
        });
        let plan = registry.plan(&set).unwrap();
        assert_eq!(
            names(&plan),
            vec!["tailwind", "shadcn", "rpc", "tanstack-query"]
        );
    }

    #[test]
    fn test_no_build_is_last() {
        let registry = Registry::builtin();
        let set = options(PartialOptions {
            rpc: Some(true),
            router: Some(Router::ReactRouter),
            linter: Some(Linter::Biome),
            no_build: Some(true),
            ..Default::default()
        });
        let plan = registry.plan(&set).unwrap();
        assert_eq!(names(&plan), vec!["rpc", "react-router", "biome", "no-build"]);
    }

    #[test]
    fn test_empty_plan_for_defaults() {
        let registry = Registry::builtin();
        let plan = registry.plan(&options(PartialOptions::default())).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_dependency_edges_override_declaration_order() {
        let registry = Registry::new(vec![
            Box::new(Fake {
                requires: &[InstallerId("base")],
                ..Fake::new("dependent")
            }),
            Box::new(Fake::new("base")),
        ]);
        let plan = registry.plan(&options(PartialOptions::default())).unwrap();
        assert_eq!(names(&plan), vec!["base", "dependent"]);
    }

    #[test]
    fn test_missing_dependency_fails() {
        let registry = Registry::new(vec![
            Box::new(Fake {
                requires: &[InstallerId("base")],
                ..Fake::new("dependent")
            }),
            Box::new(Fake {
                on: false,
                ..Fake::new("base")
            }),
        ]);
        let err = registry
            .plan(&options(PartialOptions::default()))
            .err()
            .unwrap();
        assert_eq!(
            err,
            ResolveError::MissingDependency {
                installer: InstallerId("dependent"),
                requires: InstallerId("base"),
            }
        );
    }

    #[test]
    fn test_conflicts_fail() {
        let registry = Registry::new(vec![
            Box::new(Fake {
                conflicts: &[Conflict::Installer(InstallerId("b"))],
                ..Fake::new("a")
            }),
            Box::new(Fake::new("b")),
        ]);
        let err = registry
            .plan(&options(PartialOptions::default()))
            .err()
            .unwrap();
        assert!(matches!(err, ResolveError::Conflict { .. }));

        let registry = Registry::new(vec![Box::new(Fake {
            conflicts: &[Conflict::Option(OptionKey::Linter(Linter::Eslint))],
            ..Fake::new("a")
        })]);
        let err = registry
            .plan(&options(PartialOptions::default()))
            .err()
            .unwrap();
        assert!(matches!(err, ResolveError::OptionConflict { .. }));
    }

    #[test]
    fn test_cycle_detected() {
        let registry = Registry::new(vec![
            Box::new(Fake {
                after: &[InstallerId("b")],
                ..Fake::new("a")
            }),
            Box::new(Fake {
                after: &[InstallerId("a")],
                ..Fake::new("b")
            }),
        ]);
        let err = registry
            .plan(&options(PartialOptions::default()))
            .err()
            .unwrap();
        assert_eq!(
            err,
            ResolveError::Cycle(vec![InstallerId("a"), InstallerId("b")])
        );
    }

    #[test]
    fn test_finalizer_rules() {
        let registry = Registry::new(vec![
            Box::new(Fake {
                finalizer: true,
                ..Fake::new("last")
            }),
            Box::new(Fake::new("x")),
        ]);
        let plan = registry.plan(&options(PartialOptions::default())).unwrap();
        assert_eq!(names(&plan), vec!["x", "last"]);

        let registry = Registry::new(vec![
            Box::new(Fake {
                finalizer: true,
                ..Fake::new("last")
            }),
            Box::new(Fake {
                requires: &[InstallerId("last")],
                ..Fake::new("x")
            }),
        ]);
        let err = registry
            .plan(&options(PartialOptions::default()))
            .err()
            .unwrap();
        assert!(matches!(err, ResolveError::FinalizerDependency { .. }));
    }

    #[test]
    fn test_every_reachable_set_plans() {
        let registry = Registry::builtin();
        for set in OptionSet::reachable("app", REPO) {
            let plan = registry
                .plan(&set)
                .unwrap_or_else(|e| panic!("{:?}: {}", set, e));
            let again = registry.plan(&set).unwrap();
            assert_eq!(plan.ids(), again.ids());
        }
    }

    proptest! {
        #[test]
        fn test_plan_is_topological(index in 0usize..10_000) {
            let registry = Registry::builtin();
            let sets = OptionSet::reachable("app", REPO);
            let set = &sets[index % sets.len()];
            let plan = registry.plan(set).unwrap();
            let ids = plan.ids();

            for (position, installer) in plan.steps().iter().enumerate() {
                for dep in installer.requires().iter().chain(installer.after()) {
                    if let Some(dep_position) = ids.iter().position(|i| i == dep) {
                        prop_assert!(dep_position < position, "{} before {}", dep, installer.id());
                    }
                }
                if installer.is_finalizer() {
                    prop_assert_eq!(position, ids.len() - 1);
                }
            }
        }
    }
}
