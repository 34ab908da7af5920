use anyhow::{anyhow, Context};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{fasta::read_fasta, types::ContigList};

pub fn progress_bar(len: usize, msg: String) -> anyhow::Result<ProgressBar> {
    let style =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-");
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    pb.set_message(msg);
    Ok(pb)
}

/// Bin FASTA files in `dir`, keyed by file name without the matched extension.
pub fn bin_files<P: AsRef<Path>>(
    dir: P,
    exts: &[String],
) -> anyhow::Result<BTreeMap<String, PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list dir: {}", dir.display()))?;

    let mut bins = BTreeMap::new();
    for path in entries.filter_map(Result::ok).map(|entry| entry.path()) {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let lower = filename.to_lowercase();
        // longest match first so ".fa.gz" wins over ".gz"
        let matched = exts
            .iter()
            .filter(|ext| lower.ends_with(ext.as_str()))
            .max_by_key(|ext| ext.len());
        if let Some(ext) = matched {
            let name = filename[..filename.len() - ext.len()].to_string();
            bins.insert(name, path);
        }
    }

    if bins.is_empty() {
        return Err(anyhow!("No bins found in path: {}", dir.display()));
    }
    Ok(bins)
}

/// Reads the contigs of every bin in `dir` in parallel.
pub fn load_bin_contigs<P: AsRef<Path>>(
    dir: P,
    label: &str,
    exts: &[String],
) -> anyhow::Result<BTreeMap<String, ContigList>> {
    let bin_paths: Vec<(String, PathBuf)> = bin_files(dir, exts)?.into_iter().collect();
    let pb = progress_bar(bin_paths.len(), format!("{}: Loading bins...", label))?;

    bin_paths
        .into_par_iter()
        .progress_with(pb)
        .map(|(name, path)| {
            let contigs = read_fasta(&path)
                .with_context(|| format!("Failed to read FASTA: {}", path.display()))?;
            Ok::<_, anyhow::Error>((name, contigs))
        })
        .collect::<anyhow::Result<BTreeMap<String, ContigList>>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        [".fa", ".fna", ".fasta", ".fa.gz"]
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_bin_files_strips_extension() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["bin.1.fa", "bin.2.FASTA", "bin.3.fa.gz", "notes.txt"] {
            std::fs::write(dir.path().join(f), ">c\nA\n").unwrap();
        }

        let bins = bin_files(dir.path(), &exts()).unwrap();
        let names: Vec<&str> = bins.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["bin.1", "bin.2", "bin.3"]);
    }

    #[test]
    fn test_bin_files_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(bin_files(dir.path(), &exts()).is_err());
    }

    #[test]
    fn test_load_bin_contigs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.fa"), ">c1\nACGT\n>c2\nAC\n").unwrap();
        std::fs::write(dir.path().join("b.fna"), ">c3\nA\n").unwrap();

        let bins = load_bin_contigs(dir.path(), "test", &exts()).unwrap();
        assert_eq!(bins["a"].lengths, vec![4, 2]);
        assert_eq!(bins["b"].names, vec!["c3"]);
    }
}
