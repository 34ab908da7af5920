use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{anyhow, Context, Result};

use crate::{
    consolidate::ExcludedBin,
    mixed::BinComparisons,
    types::{BinSet, BinSide, ContigList, MatchRecord},
};

const MATCH_HEADER: [&str; 26] = [
    "bin1_name",
    "bin2_name",
    "bin1_category",
    "bin2_category",
    "bin1_contig_number",
    "bin2_contig_number",
    "bin1_completeness",
    "bin2_completeness",
    "bin1_contamination",
    "bin2_contamination",
    "bin1_size",
    "bin2_size",
    "bin1_perc_bases_shared",
    "bin2_perc_bases_shared",
    "shared_contigs",
    "shared_contig_lengths",
    "shared_contigs_number",
    "shared_contig_total_bases",
    "bin1_unique_contigs",
    "bin1_unique_contig_lengths",
    "bin1_unique_contigs_number",
    "bin1_unique_contig_total_bases",
    "bin2_unique_contigs",
    "bin2_unique_contig_lengths",
    "bin2_unique_contigs_number",
    "bin2_unique_contig_total_bases",
];

fn create<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    let outfile =
        File::create(path).with_context(|| anyhow!("Could not create file: {:?}", path))?;
    Ok(BufWriter::new(outfile))
}

/// Renders the fields of a record in [`MATCH_HEADER`] order.
pub fn match_row(record: &MatchRecord, missing: &str) -> Vec<String> {
    let (b1, b2) = (record.bin1.as_ref(), record.bin2.as_ref());
    let field = |side: Option<&BinSide>, f: fn(&BinSide) -> Option<String>| {
        side.and_then(f).unwrap_or_else(|| missing.to_string())
    };

    let getters: [fn(&BinSide) -> Option<String>; 7] = [
        |s| Some(s.name.clone()),
        |s| Some(s.category.to_string()),
        |s| Some(s.contig_number.to_string()),
        |s| Some(s.completeness.to_string()),
        |s| Some(s.contamination.to_string()),
        |s| Some(s.size.to_string()),
        |s| s.perc_bases_shared.map(|p| p.to_string()),
    ];

    let mut row = Vec::with_capacity(MATCH_HEADER.len());
    for f in getters {
        row.push(field(b1, f));
        row.push(field(b2, f));
    }

    row.extend(contig_fields(record.shared.as_ref(), missing));
    row.extend(contig_fields(b1.and_then(|s| s.unique_contigs.as_ref()), missing));
    row.extend(contig_fields(b2.and_then(|s| s.unique_contigs.as_ref()), missing));
    row
}

fn contig_fields(list: Option<&ContigList>, missing: &str) -> [String; 4] {
    match list {
        Some(l) => [
            l.names.join(", "),
            l.lengths
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            l.len().to_string(),
            l.total_bases().to_string(),
        ],
        None => std::array::from_fn(|_| missing.to_string()),
    }
}

pub fn write_match_table<'a, P, I>(path: P, records: I, missing: &str) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut writer = create(&path)?;

    writeln!(writer, "{}", MATCH_HEADER.join("\t"))?;
    for record in records {
        writeln!(writer, "{}", match_row(record, missing).join("\t"))?;
    }

    writer.flush()?;
    Ok(())
}

/// One file of pairwise comparisons per bin, plus a per-bin category count summary.
pub fn write_comparisons<P: AsRef<Path>>(
    outdir: P,
    set: BinSet,
    comparisons: &[BinComparisons],
    missing: &str,
) -> Result<()> {
    let outdir = outdir.as_ref();
    let per_bin_dir = outdir.join("pairwise-bin-results");
    std::fs::create_dir_all(&per_bin_dir)
        .with_context(|| format!("Failed to create dir: {}", per_bin_dir.display()))?;

    for c in comparisons {
        let outname = per_bin_dir.join(format!("{}.{}.mixed_comparisons.txt", c.set, c.bin));
        write_match_table(outname, &c.comparisons, missing)?;
    }

    let mut writer = create(outdir.join(format!("Counts.{}.mixed_comparisons.txt", set)))?;
    writeln!(writer, "bin_name\tMixed-HS\tMixed-MS\tMixed-LS\tTotal")?;
    for c in comparisons {
        let counts = c.counts();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            c.bin, counts.hs, counts.ms, counts.ls, counts.total
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_excluded<P: AsRef<Path>>(path: P, excluded: &[ExcludedBin]) -> Result<()> {
    let mut writer = create(path)?;
    writeln!(writer, "bin_set\tbin_name\tcategory\tbest_partner")?;
    for e in excluded {
        writeln!(writer, "{}\t{}\t{}\t{}", e.set, e.name, e.category, e.partner)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_bin_list<'a, P, I>(path: P, names: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a String>,
{
    let mut writer = create(path)?;
    for name in names {
        writeln!(writer, "{}", name)?;
    }
    writer.flush()?;
    Ok(())
}
