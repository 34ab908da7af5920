use log::{debug, info};

use crate::{
    registry::Registry,
    types::{insert_record, Bin, BinSide, BinSet, Category, MatchRecord, MatchTable},
};

/// Bin pairs with exactly the same contig sets.
pub fn identical(bins1: &Registry, bins2: &Registry) -> MatchTable {
    info!("Identifying exact bin matches");
    let mut table = MatchTable::new();

    for bin1 in bins1.bins() {
        for bin2 in bins2.bins() {
            if !bin1.same_contigs(bin2) {
                continue;
            }
            debug!("Identical: {} = {}", bin1.name, bin2.name);
            insert_record(
                &mut table,
                MatchRecord {
                    bin1: Some(BinSide::snapshot(bin1, Category::Identical).with_perc(100)),
                    bin2: Some(BinSide::snapshot(bin2, Category::Identical).with_perc(100)),
                    shared: Some(bin1.all_contigs()),
                },
            );
        }
    }

    info!("Identical matches = {}", table.len());
    table
}

/// Bins of `query` that share no contig with any bin of `other`.
pub fn unique(query: &Registry, other: &Registry) -> MatchTable {
    let mut table = MatchTable::new();

    for bin in query.bins() {
        if bin.contigs.keys().any(|c| other.contains_contig(c)) {
            continue;
        }
        let side = BinSide::snapshot(bin, Category::Unique).with_unique(bin.all_contigs());
        let record = match query.set {
            BinSet::Bins1 => MatchRecord {
                bin1: Some(side),
                bin2: None,
                shared: None,
            },
            BinSet::Bins2 => MatchRecord {
                bin1: None,
                bin2: Some(side),
                shared: None,
            },
        };
        insert_record(&mut table, record);
    }

    info!("Unique to {} = {}", query.set, table.len());
    table
}

/// Superset/subset pairs whose excess contigs are not claimed anywhere in the opposing set.
pub fn superset_subset(bins1: &Registry, bins2: &Registry) -> MatchTable {
    info!("Identifying superset/subset bins");
    let mut table = MatchTable::new();
    let (mut supersets1, mut supersets2) = (0, 0);

    for bin1 in bins1.bins() {
        for bin2 in bins2.bins() {
            if bin1.strict_superset_of(bin2) {
                if let Some(record) = containment(bin1, bin2, bins2) {
                    supersets1 += 1;
                    insert_record(&mut table, record);
                }
            } else if bin2.strict_superset_of(bin1) {
                if let Some(record) = containment(bin2, bin1, bins1) {
                    supersets2 += 1;
                    insert_record(&mut table, record);
                }
            }
        }
    }

    info!("Supersets in bins1 = {}", supersets1);
    info!("Supersets in bins2 = {}", supersets2);
    info!(
        "Total superset/subset combinations = {}",
        supersets1 + supersets2
    );
    table
}

/// Builds the record for `superset` containing `subset`, or `None` when the
/// superset's extra contigs also belong to some bin of `subset_registry`.
fn containment(superset: &Bin, subset: &Bin, subset_registry: &Registry) -> Option<MatchRecord> {
    let excess = superset.contig_list(superset.difference(subset));

    if let Some(claimed) = excess
        .names
        .iter()
        .find_map(|c| subset_registry.owner(c))
    {
        debug!(
            "{} contains {} but {} is also in {}; deferring to mixed",
            superset.name, subset.name, claimed.name, claimed.bin
        );
        return None;
    }

    let subset_perc = (subset.total_length() * 100 / superset.total_length()) as u32;
    let shared = superset.contig_list(superset.intersection(subset));

    let sup = BinSide::snapshot(superset, Category::Superset)
        .with_perc(100)
        .with_unique(excess);
    let sub = BinSide::snapshot(subset, Category::Subset).with_perc(subset_perc);

    let (bin1, bin2) = match subset_registry.set {
        BinSet::Bins2 => (sup, sub),
        BinSet::Bins1 => (sub, sup),
    };
    Some(MatchRecord {
        bin1: Some(bin1),
        bin2: Some(bin2),
        shared: Some(shared),
    })
}
