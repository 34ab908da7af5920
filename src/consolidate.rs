use std::collections::BTreeSet;

use clap::ValueEnum;
use log::{info, warn};

use crate::{
    registry::Registry,
    types::{BinSet, Category, MatchRecord, MatchTable},
};

/// How Mixed bins are resolved into the final bin set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConsolidationMethod {
    /// Keep only mutual best matches, choosing the more complete bin of each pair
    Unify,
    /// Keep the bins1 side of every mixed match
    Bins1,
    /// Keep the bins2 side of every mixed match
    Bins2,
}

/// A bin dropped by unification because its best match was not reciprocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedBin {
    pub set: BinSet,
    pub name: String,
    pub category: Category,
    pub partner: String,
}

#[derive(Debug, Clone, Default)]
pub struct Unification {
    pub unified: MatchTable,
    pub excluded: Vec<ExcludedBin>,
}

/// Keeps the pairings that are the best match in both directions.
pub fn unify(best1: &MatchTable, best2: &MatchTable) -> Unification {
    info!("Unifying mixed bins");

    let unified: MatchTable = best1
        .iter()
        .filter(|(key, _)| best2.contains_key(*key))
        .map(|(key, record)| (key.clone(), record.unified()))
        .collect();
    info!("Unified bins = {}", unified.len());

    let mut excluded = Vec::new();
    for (set, table) in [(BinSet::Bins1, best1), (BinSet::Bins2, best2)] {
        for (key, record) in table {
            if unified.contains_key(key) {
                continue;
            }
            if let (Some(side), Some(partner)) = (record.side(set), record.side(set.other())) {
                excluded.push(ExcludedBin {
                    set,
                    name: side.name.clone(),
                    category: side.category,
                    partner: partner.name.clone(),
                });
            }
        }
    }

    for set in [BinSet::Bins1, BinSet::Bins2] {
        let lost: Vec<_> = excluded.iter().filter(|e| e.set == set).collect();
        info!("Excluded {} bin(s) from {}", lost.len(), set);
        for e in lost {
            info!("\t{} = {} (best match {})", e.name, e.category, e.partner);
        }
    }

    Unification { unified, excluded }
}

pub fn combine(tables: &[&MatchTable]) -> MatchTable {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Warns when some bin of the registry is missing from its combined table.
/// Returns the number of bins left uncategorised.
pub fn sanity_check(registry: &Registry, combined: &MatchTable) -> usize {
    let assigned: BTreeSet<&str> = combined
        .values()
        .filter_map(|r| r.name(registry.set))
        .collect();
    let missing: Vec<&str> = registry
        .bins()
        .map(|b| b.name.as_str())
        .filter(|n| !assigned.contains(n))
        .collect();

    if missing.is_empty() {
        info!(
            "{}: all {} bins assigned to categories",
            registry.set,
            registry.len()
        );
    } else {
        warn!(
            "{}: issue, only {} of {} bins assigned to categories; unassigned: {}",
            registry.set,
            registry.len() - missing.len(),
            registry.len(),
            missing.join(", ")
        );
    }
    missing.len()
}

/// Names of the bins kept from each input set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalBins {
    pub bins1: BTreeSet<String>,
    pub bins2: BTreeSet<String>,
}

impl FinalBins {
    fn keep(&mut self, set: BinSet, name: &str) {
        match set {
            BinSet::Bins1 => self.bins1.insert(name.to_string()),
            BinSet::Bins2 => self.bins2.insert(name.to_string()),
        };
    }

    pub fn get(&self, set: BinSet) -> &BTreeSet<String> {
        match set {
            BinSet::Bins1 => &self.bins1,
            BinSet::Bins2 => &self.bins2,
        }
    }
}

/// Picks the representative bins from the consolidated records.
pub fn select_final_bins<'a, I>(consolidated: I, method: ConsolidationMethod) -> FinalBins
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut selected = FinalBins::default();

    for record in consolidated {
        for set in [BinSet::Bins1, BinSet::Bins2] {
            let Some(side) = record.side(set) else {
                continue;
            };
            match side.category {
                Category::Unique | Category::Superset => selected.keep(set, &side.name),
                Category::Identical if set == BinSet::Bins1 => selected.keep(set, &side.name),
                c if c.is_mixed() => match method {
                    ConsolidationMethod::Bins1 | ConsolidationMethod::Bins2 => {
                        let policy_set = if method == ConsolidationMethod::Bins1 {
                            BinSet::Bins1
                        } else {
                            BinSet::Bins2
                        };
                        if set == policy_set {
                            selected.keep(set, &side.name);
                        }
                    }
                    // unified records carry the category on both sides; decide once from bin1
                    ConsolidationMethod::Unify if set == BinSet::Bins1 => {
                        if let Some(other) = record.side(BinSet::Bins2) {
                            if side.completeness.value() >= other.completeness.value() {
                                selected.keep(BinSet::Bins1, &side.name);
                            } else {
                                selected.keep(BinSet::Bins2, &other.name);
                            }
                        }
                    }
                    ConsolidationMethod::Unify => {}
                },
                _ => {}
            }
        }
    }

    info!(
        "Final bins: {} from bins1, {} from bins2",
        selected.bins1.len(),
        selected.bins2.len()
    );
    selected
}
