use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::{
    compare::{identical, superset_subset, unique},
    consolidate::{
        combine, sanity_check, select_final_bins, unify, ConsolidationMethod, FinalBins,
        Unification,
    },
    mixed::{mixed, MixedResult},
    output::{write_bin_list, write_comparisons, write_excluded, write_match_table},
    registry::Registry,
    types::{BinSet, MatchTable},
};

/// Settings of one `compare` run.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub input_tsv1: PathBuf,
    pub input_tsv2: PathBuf,
    pub method: ConsolidationMethod,
    pub outdir: PathBuf,
    pub output_tsv1: PathBuf,
    pub output_tsv2: PathBuf,
    pub output_tsv3: PathBuf,
    pub missing: String,
}

/// Every category table produced by one comparison.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub identical: MatchTable,
    pub unique1: MatchTable,
    pub unique2: MatchTable,
    pub superset: MatchTable,
    pub mixed1: MatchTable,
    pub mixed2: MatchTable,
    pub bins1_combined: MatchTable,
    pub bins2_combined: MatchTable,
    pub consolidated: MatchTable,
    pub final_bins: FinalBins,
}

/// Classifies and consolidates two registries. Produces no files.
pub fn classify(
    bins1: &Registry,
    bins2: &Registry,
    method: ConsolidationMethod,
) -> (Comparison, MixedResult, Option<Unification>) {
    let identical = identical(bins1, bins2);
    let unique1 = unique(bins1, bins2);
    let unique2 = unique(bins2, bins1);
    let superset = superset_subset(bins1, bins2);

    let mixed_result = mixed(bins1, bins2, &[&identical, &unique1, &unique2, &superset]);
    let mixed1 = mixed_result.best1.clone();
    let mixed2 = mixed_result.best2.clone();

    let bins1_combined = combine(&[&identical, &superset, &mixed1, &unique1]);
    let bins2_combined = combine(&[&identical, &superset, &mixed2, &unique2]);
    sanity_check(bins1, &bins1_combined);
    sanity_check(bins2, &bins2_combined);

    let unification = match method {
        ConsolidationMethod::Unify => Some(unify(&mixed1, &mixed2)),
        _ => None,
    };
    let selected_mixed = match (&unification, method) {
        (Some(u), _) => &u.unified,
        (None, ConsolidationMethod::Bins2) => &mixed2,
        (None, _) => &mixed1,
    };

    let consolidated = combine(&[&identical, &superset, selected_mixed, &unique1, &unique2]);
    let final_bins = select_final_bins(consolidated.values(), method);

    info!("Bins1 filtered bins: {}", bins1.len());
    info!("Bins2 filtered bins: {}", bins2.len());
    info!("Consolidated bins: {}", consolidated.len());
    info!("    Identical: {}", identical.len());
    info!("    Superset/subset: {}", superset.len());
    info!("    Mixed: {}", selected_mixed.len());
    info!("    Bins1 unique: {}", unique1.len());
    info!("    Bins2 unique: {}", unique2.len());

    let comparison = Comparison {
        identical,
        unique1,
        unique2,
        superset,
        mixed1,
        mixed2,
        bins1_combined,
        bins2_combined,
        consolidated,
        final_bins,
    };
    (comparison, mixed_result, unification)
}

pub fn run(config: &CompareConfig) -> Result<Comparison> {
    std::fs::create_dir_all(&config.outdir)
        .with_context(|| format!("Failed to create dir: {}", config.outdir.display()))?;

    let bins1 = Registry::from_tsv(BinSet::Bins1, &config.input_tsv1)
        .with_context(|| format!("Failed to load {}", config.input_tsv1.display()))?;
    let bins2 = Registry::from_tsv(BinSet::Bins2, &config.input_tsv2)
        .with_context(|| format!("Failed to load {}", config.input_tsv2.display()))?;

    let (comparison, mixed_result, unification) = classify(&bins1, &bins2, config.method);

    let missing = config.missing.as_str();
    write_comparisons(&config.outdir, BinSet::Bins1, &mixed_result.comparisons1, missing)?;
    write_comparisons(&config.outdir, BinSet::Bins2, &mixed_result.comparisons2, missing)?;
    if let Some(u) = &unification {
        write_excluded(config.outdir.join("Results.Unify_Excluded.tsv"), &u.excluded)?;
    }

    let outdir: &Path = &config.outdir;
    for (name, table) in [
        ("Results.Identical.tsv", &comparison.identical),
        ("Results.Unique_Bins1.tsv", &comparison.unique1),
        ("Results.Unique_Bins2.tsv", &comparison.unique2),
        ("Results.Superset_Subset.tsv", &comparison.superset),
        ("Results.Mixed_Bins1.tsv", &comparison.mixed1),
        ("Results.Mixed_Bins2.tsv", &comparison.mixed2),
    ] {
        write_match_table(outdir.join(name), table.values(), missing)?;
    }
    write_match_table(&config.output_tsv1, comparison.bins1_combined.values(), missing)?;
    write_match_table(&config.output_tsv2, comparison.bins2_combined.values(), missing)?;
    write_match_table(&config.output_tsv3, comparison.consolidated.values(), missing)?;

    for set in [BinSet::Bins1, BinSet::Bins2] {
        write_bin_list(
            outdir.join(format!("Final.{}.txt", set)),
            comparison.final_bins.get(set),
        )?;
    }

    info!("Wrote results to {}", outdir.display());
    Ok(comparison)
}
