use std::collections::BTreeSet;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    registry::Registry,
    types::{insert_record, Bin, BinSide, BinSet, Category, MatchRecord, MatchTable},
};

/// Every overlapping comparison for one bin, in sorted partner order.
#[derive(Debug, Clone)]
pub struct BinComparisons {
    pub set: BinSet,
    pub bin: String,
    pub comparisons: Vec<MatchRecord>,
}

impl BinComparisons {
    /// Comparison with the highest percent of this bin's bases shared.
    /// Ties keep the earliest partner in name order.
    pub fn best(&self) -> Option<&MatchRecord> {
        let mut best: Option<(&MatchRecord, u32)> = None;
        for record in &self.comparisons {
            let perc = shared_perc(record, self.set);
            if best.map_or(true, |(_, p)| perc > p) {
                best = Some((record, perc));
            }
        }
        best.map(|(r, _)| r)
    }

    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts::tally(
            self.comparisons
                .iter()
                .filter_map(|r| r.category(self.set)),
        )
    }
}

fn shared_perc(record: &MatchRecord, set: BinSet) -> u32 {
    record
        .side(set)
        .and_then(|s| s.perc_bases_shared)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub hs: usize,
    pub ms: usize,
    pub ls: usize,
    pub total: usize,
}

impl CategoryCounts {
    pub fn tally<I: IntoIterator<Item = Category>>(categories: I) -> Self {
        let mut counts = Self::default();
        for c in categories {
            match c {
                Category::MixedHs => counts.hs += 1,
                Category::MixedMs => counts.ms += 1,
                Category::MixedLs => counts.ls += 1,
                _ => {}
            }
            counts.total += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Default)]
pub struct MixedResult {
    pub best1: MatchTable,
    pub best2: MatchTable,
    pub comparisons1: Vec<BinComparisons>,
    pub comparisons2: Vec<BinComparisons>,
}

/// Scores every still-uncategorised bin against every uncategorised bin of the other set.
pub fn mixed(bins1: &Registry, bins2: &Registry, classified: &[&MatchTable]) -> MixedResult {
    info!("Pairwise comparisons for mixed bins");

    let filtered1 = remaining(bins1, classified);
    let filtered2 = remaining(bins2, classified);

    let comparisons1 = pass(&filtered1, &filtered2, BinSet::Bins1);
    let comparisons2 = pass(&filtered2, &filtered1, BinSet::Bins2);

    let best1 = best_matches(&comparisons1);
    let best2 = best_matches(&comparisons2);

    for (set, filtered, best) in [
        (BinSet::Bins1, filtered1.len(), &best1),
        (BinSet::Bins2, filtered2.len(), &best2),
    ] {
        let counts = CategoryCounts::tally(best.values().filter_map(|r| r.category(set)));
        info!(
            "{} starting bins = {}, confirmed mixed bins = {}",
            set, filtered, counts.total
        );
        info!(
            "\tMixed-HS bins: {}\n\tMixed-MS bins: {}\n\tMixed-LS bins: {}",
            counts.hs, counts.ms, counts.ls
        );
    }

    MixedResult {
        best1,
        best2,
        comparisons1,
        comparisons2,
    }
}

/// Bins of `registry` not already named on its side of any classified record.
fn remaining<'a>(registry: &'a Registry, classified: &[&MatchTable]) -> Vec<&'a Bin> {
    let claimed: BTreeSet<&str> = classified
        .iter()
        .flat_map(|t| t.values())
        .filter_map(|r| r.name(registry.set))
        .collect();

    registry
        .bins()
        .filter(|b| !claimed.contains(b.name.as_str()))
        .collect()
}

fn pass(query: &[&Bin], others: &[&Bin], set: BinSet) -> Vec<BinComparisons> {
    query
        .par_iter()
        .map(|bin| {
            let comparisons = others
                .iter()
                .filter_map(|other| match set {
                    BinSet::Bins1 => compare_pair(bin, other, set),
                    BinSet::Bins2 => compare_pair(other, bin, set),
                })
                .collect();
            BinComparisons {
                set,
                bin: bin.name.clone(),
                comparisons,
            }
        })
        .collect()
}

fn best_matches(comparisons: &[BinComparisons]) -> MatchTable {
    let mut table = MatchTable::new();
    for c in comparisons {
        match c.best() {
            Some(record) => insert_record(&mut table, record.clone()),
            None => warn!(
                "{}: {} shares no contigs with any remaining bin of {}",
                c.set,
                c.bin,
                c.set.other()
            ),
        }
    }
    table
}

/// Scores one overlapping pair from the perspective of `query`; the other side is
/// labelled `reference`. Returns `None` when no contigs are shared.
pub fn compare_pair(bin1: &Bin, bin2: &Bin, query: BinSet) -> Option<MatchRecord> {
    let shared = bin1.contig_list(bin1.intersection(bin2));
    if shared.is_empty() {
        return None;
    }
    let unique1 = bin1.contig_list(bin1.difference(bin2));
    let unique2 = bin2.contig_list(bin2.difference(bin1));

    let shared_bases = shared.total_bases();
    let perc1 = percent(shared_bases, unique1.total_bases());
    let perc2 = percent(shared_bases, unique2.total_bases());
    let status = Category::from_shared_percentages(perc1, perc2);

    debug!(
        "{} vs {}: {}% / {}% -> {}",
        bin1.name, bin2.name, perc1, perc2, status
    );

    let (cat1, cat2) = match query {
        BinSet::Bins1 => (status, Category::Reference),
        BinSet::Bins2 => (Category::Reference, status),
    };
    Some(MatchRecord {
        bin1: Some(
            BinSide::snapshot(bin1, cat1)
                .with_perc(perc1)
                .with_unique(unique1),
        ),
        bin2: Some(
            BinSide::snapshot(bin2, cat2)
                .with_perc(perc2)
                .with_unique(unique2),
        ),
        shared: Some(shared),
    })
}

fn percent(shared: u64, unique: u64) -> u32 {
    (shared * 100 / (shared + unique)) as u32
}
