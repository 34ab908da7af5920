use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indicatif::ParallelProgressIterator;
use log::info;
use rayon::prelude::*;

use crate::{io::progress_bar, types::BinSet};

const SOURCE_EXTENSIONS: [&str; 3] = ["fa", "fasta", "fna"];

#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Directory holding the `Final.bins1.txt`/`Final.bins2.txt` lists written by `compare`.
    pub results_dir: PathBuf,
    pub indir1: PathBuf,
    pub indir2: PathBuf,
    pub label1: String,
    pub label2: String,
    pub outdir: PathBuf,
    pub extension: String,
}

pub fn read_bin_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bin list: {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn source_fasta(bin_dir: &Path, bin: &str) -> Result<PathBuf> {
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| bin_dir.join(format!("{}.{}", bin, ext)))
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow!(
                "No FASTA for bin {} in {}; only .fa, .fna, and .fasta are accepted",
                bin,
                bin_dir.display()
            )
        })
}

/// Copies each named bin to `{outdir}/{label}_{bin}.{extension}`.
pub fn copy_bins(
    bins: &[String],
    bin_dir: &Path,
    outdir: &Path,
    label: &str,
    extension: &str,
) -> Result<usize> {
    if bins.is_empty() {
        info!("{}: No bins to copy", label);
        return Ok(0);
    }
    std::fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create dir: {}", outdir.display()))?;

    let pb = progress_bar(bins.len(), format!("{}: Copying bins...", label))?;
    bins.par_iter()
        .progress_with(pb)
        .try_for_each(|bin| -> Result<()> {
            let src = source_fasta(bin_dir, bin)?;
            let dest = outdir.join(format!("{}_{}.{}", label, bin, extension));
            std::fs::copy(&src, &dest)
                .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
            Ok(())
        })?;

    info!("{}: Wrote {} bin files", label, bins.len());
    Ok(bins.len())
}

pub fn run(config: &CopyConfig) -> Result<usize> {
    let mut copied = 0;
    for (set, bin_dir, label) in [
        (BinSet::Bins1, &config.indir1, &config.label1),
        (BinSet::Bins2, &config.indir2, &config.label2),
    ] {
        let bins = read_bin_list(config.results_dir.join(format!("Final.{}.txt", set)))?;
        copied += copy_bins(&bins, bin_dir, &config.outdir, label, &config.extension)?;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_bins_renames() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("bin.1.fasta"), ">c1\nACGT\n").unwrap();
        std::fs::write(src.path().join("bin.2.fna"), ">c2\nAC\n").unwrap();

        let bins = vec!["bin.1".to_string(), "bin.2".to_string()];
        let n = copy_bins(&bins, src.path(), out.path(), "hifiasm", "fa").unwrap();

        assert_eq!(n, 2);
        assert!(out.path().join("hifiasm_bin.1.fa").exists());
        assert!(out.path().join("hifiasm_bin.2.fa").exists());
    }

    #[test]
    fn test_copy_bins_unknown_extension_fails() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("bin.1.fas"), ">c1\nACGT\n").unwrap();

        let bins = vec!["bin.1".to_string()];
        assert!(copy_bins(&bins, src.path(), out.path(), "bins1", "fa").is_err());
    }

    #[test]
    fn test_read_bin_list_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Final.bins1.txt");
        std::fs::write(&path, "bin.1\n\nbin.2\n").unwrap();
        assert_eq!(read_bin_list(&path).unwrap(), vec!["bin.1", "bin.2"]);
    }
}
