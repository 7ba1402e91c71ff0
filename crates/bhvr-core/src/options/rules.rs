//! Dependency and exclusivity rules between features

use super::{ConfigError, Feature};
use std::collections::BTreeSet;

/// Declarative rules over [`Feature`] sets
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    /// `(a, [b..])`: `a` active implies every `b` active
    pub requires: &'static [(Feature, &'static [Feature])],
    /// At most one member of each group may be active
    pub exclusive: &'static [&'static [Feature]],
}

/// The rules every resolved option set obeys
pub const FEATURE_RULES: Rules = Rules {
    requires: &[(Feature::Shadcn, &[Feature::Tailwind])],
    exclusive: &[&[
        Feature::ReactRouter,
        Feature::ReactRouterMpa,
        Feature::TanstackRouter,
    ]],
};

impl Rules {
    pub fn requirements_of(&self, feature: Feature) -> &'static [Feature] {
        self.requires
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, reqs)| *reqs)
            .unwrap_or(&[])
    }

    /// Activate missing requirements and check exclusivity.
    ///
    /// A requirement listed in `forced_off` cannot be auto-activated and
    /// fails with [`ConfigError::MissingRequirement`]. Returns the features
    /// that were switched on, in activation order.
    pub fn normalize(
        &self,
        active: &mut BTreeSet<Feature>,
        forced_off: &BTreeSet<Feature>,
    ) -> Result<Vec<Feature>, ConfigError> {
        let mut enabled = Vec::new();

        loop {
            let mut changed = false;
            for (feature, reqs) in self.requires {
                if !active.contains(feature) {
                    continue;
                }
                for req in *reqs {
                    if active.contains(req) {
                        continue;
                    }
                    if forced_off.contains(req) {
                        return Err(ConfigError::MissingRequirement {
                            feature: *feature,
                            requires: *req,
                        });
                    }
                    active.insert(*req);
                    enabled.push(*req);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for group in self.exclusive {
            let hits: Vec<Feature> = group
                .iter()
                .copied()
                .filter(|f| active.contains(f))
                .collect();
            if hits.len() > 1 {
                return Err(ConfigError::Exclusive { active: hits });
            }
        }

        Ok(enabled)
    }

    /// Whether a feature combination can come out of resolution
    pub fn is_reachable(&self, set: &BTreeSet<Feature>) -> bool {
        let requirements_met = self.requires.iter().all(|(feature, reqs)| {
            !set.contains(feature) || reqs.iter().all(|r| set.contains(r))
        });
        let exclusive_ok = self
            .exclusive
            .iter()
            .all(|group| group.iter().filter(|f| set.contains(f)).count() <= 1);
        requirements_met && exclusive_ok
    }

    /// Drop features implied by another member of the set.
    ///
    /// `{shadcn, tailwind, rpc}` reduces to `{shadcn, rpc}`: naming tailwind
    /// next to shadcn adds nothing.
    pub fn reduce(&self, set: &BTreeSet<Feature>) -> BTreeSet<Feature> {
        set.iter()
            .copied()
            .filter(|candidate| {
                !set.iter()
                    .any(|other| other != candidate && self.implies(*other, *candidate))
            })
            .collect()
    }

    fn implies(&self, from: Feature, to: Feature) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            for req in self.requirements_of(current) {
                if *req == to {
                    return true;
                }
                if seen.insert(*req) {
                    stack.push(*req);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(features: &[Feature]) -> BTreeSet<Feature> {
        features.iter().copied().collect()
    }

    #[test]
    fn test_normalize_auto_activates_requirement() {
        let mut active = set(&[Feature::Shadcn, Feature::Rpc]);
        let enabled = FEATURE_RULES.normalize(&mut active, &BTreeSet::new()).unwrap();
        assert_eq!(enabled, vec![Feature::Tailwind]);
        assert!(active.contains(&Feature::Tailwind));
    }

    #[test]
    fn test_normalize_rejects_forced_off_requirement() {
        let mut active = set(&[Feature::Shadcn]);
        let err = FEATURE_RULES
            .normalize(&mut active, &set(&[Feature::Tailwind]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequirement {
                feature: Feature::Shadcn,
                requires: Feature::Tailwind,
            }
        );
    }

    #[test]
    fn test_normalize_rejects_exclusive_pair() {
        let mut active = set(&[Feature::ReactRouter, Feature::TanstackRouter]);
        let err = FEATURE_RULES
            .normalize(&mut active, &BTreeSet::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Exclusive { .. }));
    }

    #[test]
    fn test_is_reachable() {
        assert!(FEATURE_RULES.is_reachable(&set(&[])));
        assert!(FEATURE_RULES.is_reachable(&set(&[Feature::Shadcn, Feature::Tailwind])));
        assert!(!FEATURE_RULES.is_reachable(&set(&[Feature::Shadcn])));
        assert!(!FEATURE_RULES.is_reachable(&set(&[
            Feature::ReactRouterMpa,
            Feature::TanstackRouter
        ])));
    }

    #[test]
    fn test_reduce_drops_implied() {
        let reduced = FEATURE_RULES.reduce(&set(&[
            Feature::Shadcn,
            Feature::Tailwind,
            Feature::Rpc,
        ]));
        assert_eq!(reduced, set(&[Feature::Shadcn, Feature::Rpc]));

        let untouched = FEATURE_RULES.reduce(&set(&[Feature::Tailwind, Feature::Rpc]));
        assert_eq!(untouched, set(&[Feature::Tailwind, Feature::Rpc]));
    }
}
