use std::{
    cmp::Ordering,
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::{io::load_bin_contigs, registry::Status, types::ContigList};

/// Columns added to a CheckM2 report, inserted after Name/Completeness/Contamination.
const ADDED_COLUMNS: [&str; 4] = ["Contig_Number", "Contig_Names", "Contig_Lengths", "Status"];
const INSERT_AT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub min_completeness: f64,
    pub max_contamination: f64,
    pub max_contigs: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_completeness: 70.0,
            max_contamination: 10.0,
            max_contigs: 20,
        }
    }
}

impl Thresholds {
    pub fn status(&self, completeness: f64, contamination: f64, contigs: usize) -> Status {
        if completeness >= self.min_completeness
            && contamination <= self.max_contamination
            && contigs <= self.max_contigs
        {
            Status::Pass
        } else {
            Status::Fail
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub report: PathBuf,
    pub bin_dir: PathBuf,
    pub extensions: Vec<String>,
    pub thresholds: Thresholds,
    pub output: PathBuf,
    pub target_outfile: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AnnotatedRow {
    pub name: String,
    pub completeness: f64,
    pub status: Status,
    pub contig_number: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnnotatedReport {
    pub header: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
}

impl AnnotatedReport {
    pub fn passing(&self) -> usize {
        self.rows.iter().filter(|r| r.status == Status::Pass).count()
    }
}

/// Adds contig membership and a Pass/Fail status to every bin of a CheckM2 report.
/// Rows are sorted Pass first, then by contig count, then by descending completeness.
pub fn annotate<R: std::io::Read>(
    mut report: csv::Reader<R>,
    contigs: &BTreeMap<String, ContigList>,
    thresholds: &Thresholds,
) -> Result<AnnotatedReport> {
    let original: Vec<String> = report.headers()?.iter().map(str::to_string).collect();
    let column = |name: &str| {
        original
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("CheckM2 report is missing the {} column", name))
    };
    let (name_idx, compl_idx, contam_idx) = (
        column("Name")?,
        column("Completeness")?,
        column("Contamination")?,
    );
    let header = insert_columns(&original, ADDED_COLUMNS.map(String::from));

    let mut rows = Vec::new();
    for (i, record) in report.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CheckM2 row {}", i + 2))?;
        let name = record[name_idx].to_string();
        let completeness: f64 = record[compl_idx]
            .parse()
            .with_context(|| format!("Invalid Completeness for {}", name))?;
        let contamination: f64 = record[contam_idx]
            .parse()
            .with_context(|| format!("Invalid Contamination for {}", name))?;
        let bin_contigs = contigs
            .get(&name)
            .ok_or_else(|| anyhow!("No FASTA file found for bin {}", name))?;

        let status = thresholds.status(completeness, contamination, bin_contigs.len());
        let original_fields: Vec<String> = record.iter().map(str::to_string).collect();
        let lengths: Vec<String> = bin_contigs.lengths.iter().map(u64::to_string).collect();
        let fields = insert_columns(
            &original_fields,
            [
                bin_contigs.len().to_string(),
                bin_contigs.names.join(", "),
                lengths.join(", "),
                status.to_string(),
            ],
        );

        rows.push(AnnotatedRow {
            name,
            completeness,
            status,
            contig_number: bin_contigs.len(),
            fields,
        });
    }

    rows.sort_by(|a, b| {
        let pass_first = (b.status == Status::Pass).cmp(&(a.status == Status::Pass));
        pass_first
            .then(a.contig_number.cmp(&b.contig_number))
            .then(
                b.completeness
                    .partial_cmp(&a.completeness)
                    .unwrap_or(Ordering::Equal),
            )
    });

    Ok(AnnotatedReport { header, rows })
}

fn insert_columns(fields: &[String], added: [String; 4]) -> Vec<String> {
    let mut out = fields[..INSERT_AT].to_vec();
    out.extend(added);
    out.extend_from_slice(&fields[INSERT_AT..]);
    out
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &AnnotatedReport) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Could not create file: {:?}", path))?;
    writer.write_record(&report.header)?;
    for row in &report.rows {
        writer.write_record(&row.fields)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run(config: &FilterConfig) -> Result<AnnotatedReport> {
    let label = config
        .bin_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("bins");
    let contigs = load_bin_contigs(&config.bin_dir, label, &config.extensions)?;

    let reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(&config.report)
        .with_context(|| format!("Failed to open {}", config.report.display()))?;
    let report = annotate(reader, &contigs, &config.thresholds)?;

    info!(
        "{}: {} of {} bins pass filtering",
        config.report.display(),
        report.passing(),
        report.rows.len()
    );
    for row in report.rows.iter().filter(|r| r.status == Status::Fail) {
        info!("\t{} failed filtering", row.name);
    }

    write_report(&config.output, &report)?;
    if let Some(target) = &config.target_outfile {
        let mut fh = std::fs::File::create(target)
            .with_context(|| format!("Could not create file: {:?}", target))?;
        writeln!(fh, "{}", report.passing())?;
    }
    Ok(report)
}
