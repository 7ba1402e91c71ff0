//! Store completeness: every variant a reachable option set can ask for exists

use super::store::{Slot, TemplateRef, TemplateStore};
use crate::installers::{InstallerId, Registry, ResolveError};
use crate::options::{Feature, OptionSet, FEATURE_RULES};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A variant some installer would read but the store lacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariant {
    pub installer: InstallerId,
    pub reference: TemplateRef,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    /// Option sets enumerated
    pub option_sets: usize,
    /// Distinct variants looked up
    pub checked: usize,
    pub missing: Vec<MissingVariant>,
}

impl CheckReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Plan every reachable option set and look up each variant its installers read
pub fn check_registry(
    registry: &Registry,
    store: &dyn TemplateStore,
    repo: &str,
) -> Result<CheckReport, ResolveError> {
    let sets = OptionSet::reachable("check", repo);
    let mut wanted: BTreeMap<TemplateRef, InstallerId> = BTreeMap::new();

    for set in &sets {
        let plan = registry.plan(set)?;
        for installer in plan.steps() {
            for reference in installer.templates(set) {
                wanted.entry(reference).or_insert(installer.id());
            }
        }
    }

    let missing = wanted
        .iter()
        .filter(|(reference, _)| !store.contains(reference.slot, &reference.variant))
        .map(|(reference, installer)| MissingVariant {
            installer: *installer,
            path: store.variant_path(reference.slot, &reference.variant),
            reference: reference.clone(),
        })
        .collect();

    tracing::debug!(option_sets = sets.len(), variants = wanted.len(), "store checked");
    Ok(CheckReport {
        option_sets: sets.len(),
        checked: wanted.len(),
        missing,
    })
}

/// Every subset of `relevant` that satisfies the feature rules
pub fn slot_combinations(relevant: &[Feature]) -> Vec<BTreeSet<Feature>> {
    let relevant: Vec<Feature> = relevant
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    (0u32..(1 << relevant.len()))
        .map(|mask| {
            relevant
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << *bit) != 0)
                .map(|(_, feature)| *feature)
                .collect::<BTreeSet<_>>()
        })
        .filter(|set| FEATURE_RULES.is_reachable(set))
        .collect()
}

/// Store paths missing for `slot` across all combinations of `relevant`
pub fn check_slot(store: &dyn TemplateStore, slot: Slot, relevant: &[Feature]) -> Vec<PathBuf> {
    let variants: BTreeSet<String> = slot_combinations(relevant)
        .iter()
        .map(|set| TemplateRef::with_features(slot, set).variant)
        .collect();

    variants
        .into_iter()
        .filter(|variant| !store.contains(slot, variant))
        .map(|variant| store.variant_path(slot, &variant))
        .collect()
}
