use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    consolidate::ConsolidationMethod, copy::CopyConfig, filter::FilterConfig,
    filter::Thresholds, pipeline::CompareConfig,
};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Compare and consolidate two sets of MAG bins by contig membership")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, default_value_t = 1, global = true, help = "Num threads")]
    pub threads: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add contig membership and Pass/Fail status to a CheckM2 quality report
    Filter(FilterArgs),
    /// Classify bin pairs across two filtered quality tables and consolidate them
    Compare(CompareArgs),
    /// Copy the consolidated bins chosen by `compare` into one directory
    Copy(CopyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(short = 'i', long, help = "CheckM2 quality_report.tsv")]
    pub input_tsv: PathBuf,

    #[arg(short, long, help = "Directory with the bins scored in the report")]
    pub bin_dir: PathBuf,

    #[arg(short, long, num_args(1..), default_values=vec![".fa", ".fna", ".fasta", ".fa.gz", ".fna.gz", ".fasta.gz"], help="Extensions to look for in the bin directory")]
    pub extensions: Vec<String>,

    #[arg(long, default_value_t = 70.0, help = "Minimum completeness (percent)")]
    pub min_completeness: f64,

    #[arg(long, default_value_t = 10.0, help = "Maximum contamination (percent)")]
    pub max_contamination: f64,

    #[arg(long, default_value_t = 20, help = "Maximum number of contigs in a bin")]
    pub max_contigs: usize,

    #[arg(short, long, help = "Annotated quality table to write")]
    pub output: PathBuf,

    #[arg(long, help = "File to write the number of passing bins to")]
    pub target_outfile: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(long, help = "Filtered quality table for bins1")]
    pub input_tsv1: PathBuf,

    #[arg(long, help = "Filtered quality table for bins2")]
    pub input_tsv2: PathBuf,

    #[arg(short, long, value_enum, help = "Strategy to select mixed bins")]
    pub consolidation_method: ConsolidationMethod,

    #[arg(short, long, default_value = "output", help = "Path to output directory")]
    pub outdir: PathBuf,

    #[arg(long, help = "bins1 comparison summary tsv to write")]
    pub output_tsv1: PathBuf,

    #[arg(long, help = "bins2 comparison summary tsv to write")]
    pub output_tsv2: PathBuf,

    #[arg(long, help = "Consolidated summary tsv to write")]
    pub output_tsv3: PathBuf,

    #[arg(short, long, default_value = "NA", help = "Symbol to use for missing data")]
    pub missing_data_char: String,
}

#[derive(Args, Debug, Clone)]
pub struct CopyArgs {
    #[arg(short, long, help = "Output directory of the compare step")]
    pub results_dir: PathBuf,

    #[arg(long, help = "Directory with the bins1 FASTA files")]
    pub indir1: PathBuf,

    #[arg(long, help = "Directory with the bins2 FASTA files")]
    pub indir2: PathBuf,

    #[arg(long, default_value = "bins1", help = "Prefix for bins1 files")]
    pub label1: String,

    #[arg(long, default_value = "bins2", help = "Prefix for bins2 files")]
    pub label2: String,

    #[arg(short, long, help = "Directory to copy the final bins to")]
    pub outdir: PathBuf,

    #[arg(short, long, default_value = "fa", help = "Extension of the copied FASTA files")]
    pub extension: String,
}

pub fn parse_args() -> Cli {
    let mut cli = Cli::parse();

    if let Command::Filter(args) = &mut cli.command {
        args.extensions = args
            .extensions
            .iter()
            .map(|e| e.to_lowercase())
            .collect();
    }
    cli
}

impl From<FilterArgs> for FilterConfig {
    fn from(args: FilterArgs) -> Self {
        Self {
            report: args.input_tsv,
            bin_dir: args.bin_dir,
            extensions: args.extensions,
            thresholds: Thresholds {
                min_completeness: args.min_completeness,
                max_contamination: args.max_contamination,
                max_contigs: args.max_contigs,
            },
            output: args.output,
            target_outfile: args.target_outfile,
        }
    }
}

impl From<CompareArgs> for CompareConfig {
    fn from(args: CompareArgs) -> Self {
        Self {
            input_tsv1: args.input_tsv1,
            input_tsv2: args.input_tsv2,
            method: args.consolidation_method,
            outdir: args.outdir,
            output_tsv1: args.output_tsv1,
            output_tsv2: args.output_tsv2,
            output_tsv3: args.output_tsv3,
            missing: args.missing_data_char,
        }
    }
}

impl From<CopyArgs> for CopyConfig {
    fn from(args: CopyArgs) -> Self {
        Self {
            results_dir: args.results_dir,
            indir1: args.indir1,
            indir2: args.indir2,
            label1: args.label1,
            label2: args.label2,
            outdir: args.outdir,
            extension: args.extension,
        }
    }
}
