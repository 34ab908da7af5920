use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::Path,
};

use log::{debug, info};
use serde::Deserialize;

use crate::{
    error::LoadError,
    types::{Bin, BinSet, Contig, Score},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Status {
    Pass,
    Fail,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => f.write_str("Pass"),
            Status::Fail => f.write_str("Fail"),
        }
    }
}

/// One row of a filtered quality table. Extra CheckM2 columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct QualityRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Completeness")]
    pub completeness: Score,
    #[serde(rename = "Contamination")]
    pub contamination: Score,
    #[serde(rename = "Contig_Number")]
    pub contig_number: usize,
    #[serde(rename = "Contig_Names")]
    pub contig_names: String,
    #[serde(rename = "Contig_Lengths")]
    pub contig_lengths: String,
    #[serde(rename = "Status")]
    pub status: Status,
}

impl QualityRow {
    /// Pairs up the `", "`-joined name and length columns.
    fn contigs(&self, row: u64) -> Result<Vec<(String, u64)>, LoadError> {
        let malformed = |reason: String| LoadError::MalformedRow {
            row,
            bin: self.name.clone(),
            reason,
        };

        let names: Vec<&str> = split_list(&self.contig_names);
        let lengths: Vec<&str> = split_list(&self.contig_lengths);

        if names.is_empty() {
            return Err(malformed("no contigs listed".to_string()));
        }
        if names.len() != lengths.len() {
            return Err(malformed(format!(
                "{} contig names but {} contig lengths",
                names.len(),
                lengths.len()
            )));
        }
        if names.len() != self.contig_number {
            return Err(malformed(format!(
                "Contig_Number is {} but {} contigs are listed",
                self.contig_number,
                names.len()
            )));
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut contigs = Vec::with_capacity(names.len());
        for (name, len) in names.into_iter().zip(lengths) {
            if !seen.insert(name) {
                return Err(LoadError::DuplicateContig {
                    contig: name.to_string(),
                    first_bin: self.name.clone(),
                    second_bin: self.name.clone(),
                });
            }
            match len.parse::<u64>() {
                Ok(l) if l > 0 => contigs.push((name.to_string(), l)),
                _ => {
                    return Err(malformed(format!(
                        "invalid length '{}' for contig {}",
                        len, name
                    )))
                }
            }
        }
        Ok(contigs)
    }
}

fn split_list(field: &str) -> Vec<&str> {
    field
        .trim()
        .split(", ")
        .filter(|s| !s.is_empty())
        .collect()
}

/// Bins of one input set, keyed by name, with the inverted contig index.
#[derive(Debug, Clone)]
pub struct Registry {
    pub set: BinSet,
    bins: BTreeMap<String, Bin>,
    contigs: HashMap<String, Contig>,
}

impl Registry {
    pub fn new(set: BinSet) -> Self {
        Self {
            set,
            bins: BTreeMap::new(),
            contigs: HashMap::new(),
        }
    }

    /// Builds a registry from bins, rejecting duplicate bin or contig names.
    pub fn from_bins<I>(set: BinSet, bins: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = Bin>,
    {
        let mut registry = Self::new(set);
        for bin in bins {
            registry.insert(bin)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, bin: Bin) -> Result<(), LoadError> {
        if self.bins.contains_key(&bin.name) {
            return Err(LoadError::DuplicateBin(bin.name));
        }
        for (name, length) in &bin.contigs {
            if let Some(existing) = self.contigs.get(name) {
                return Err(LoadError::DuplicateContig {
                    contig: name.clone(),
                    first_bin: existing.bin.clone(),
                    second_bin: bin.name.clone(),
                });
            }
            self.contigs.insert(
                name.clone(),
                Contig {
                    name: name.clone(),
                    length: *length,
                    bin: bin.name.clone(),
                },
            );
        }
        self.bins.insert(bin.name.clone(), bin);
        Ok(())
    }

    /// Loads the `Pass` rows of a quality table. `Fail` rows are skipped.
    pub fn from_tsv<P: AsRef<Path>>(set: BinSet, path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("{}: Loading bins from {}", set, path.display());

        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(std::io::BufReader::new(file));
        Self::from_reader(set, reader)
    }

    pub fn from_reader<R: std::io::Read>(
        set: BinSet,
        mut reader: csv::Reader<R>,
    ) -> Result<Self, LoadError> {
        let mut registry = Self::new(set);
        let mut failed = 0;

        for (i, result) in reader.deserialize::<QualityRow>().enumerate() {
            // header is row 1
            let row = i as u64 + 2;
            let record = result.map_err(|source| LoadError::Csv { row, source })?;

            if record.status == Status::Fail {
                debug!("{}: {} failed filtering", set, record.name);
                failed += 1;
                continue;
            }

            let contigs = record.contigs(row)?;
            registry.insert(Bin::new(
                &record.name,
                record.completeness,
                record.contamination,
                contigs,
            ))?;
        }

        info!(
            "{}: {} passing bins, {} failed filtering",
            set,
            registry.len(),
            failed
        );
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Bin> {
        self.bins.get(name)
    }

    /// Bins in sorted name order.
    pub fn bins(&self) -> impl Iterator<Item = &Bin> {
        self.bins.values()
    }

    pub fn owner(&self, contig: &str) -> Option<&Contig> {
        self.contigs.get(contig)
    }

    pub fn contains_contig(&self, contig: &str) -> bool {
        self.contigs.contains_key(contig)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Name\tCompleteness\tContamination\tContig_Number\tContig_Names\tContig_Lengths\tStatus\tGC_Content\n";

    fn load(text: &str) -> Result<Registry, LoadError> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(text.as_bytes());
        Registry::from_reader(BinSet::Bins1, reader)
    }

    #[test]
    fn test_load_pass_rows() {
        let text = format!(
            "{HEADER}bin.1\t95.5\t1.2\t2\tc1, c2\t100, 200\tPass\t0.5\n\
             bin.2\t40.0\t20.0\t1\tc3\t300\tFail\t0.4\n"
        );
        let registry = load(&text).unwrap();

        assert_eq!(registry.len(), 1);
        let bin = registry.get("bin.1").unwrap();
        assert_eq!(bin.total_length(), 300);
        assert_eq!(bin.contig_number(), 2);
        assert_eq!(registry.owner("c2").unwrap().bin, "bin.1");
        assert_eq!(registry.owner("c2").unwrap().length, 200);
        assert!(registry.get("bin.2").is_none());
        assert!(!registry.contains_contig("c3"));
    }

    #[test]
    fn test_empty_registry_is_legal() {
        let text = format!("{HEADER}bin.1\t10.0\t50.0\t1\tc1\t100\tFail\t0.5\n");
        let registry = load(&text).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_non_numeric_length_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t2\tc1, c2\t100, abc\tPass\t0.5\n");
        assert!(matches!(
            load(&text),
            Err(LoadError::MalformedRow { row: 2, .. })
        ));
    }

    #[test]
    fn test_length_count_mismatch_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t2\tc1, c2\t100\tPass\t0.5\n");
        assert!(matches!(load(&text), Err(LoadError::MalformedRow { .. })));
    }

    #[test]
    fn test_contig_number_mismatch_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t3\tc1, c2\t100, 200\tPass\t0.5\n");
        assert!(matches!(
            load(&text),
            Err(LoadError::MalformedRow { row: 2, .. })
        ));
    }

    #[test]
    fn test_zero_length_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t2\tc1, c2\t100, 0\tPass\t0.5\n");
        assert!(matches!(
            load(&text),
            Err(LoadError::MalformedRow { row: 2, .. })
        ));
    }

    #[test]
    fn test_empty_contig_list_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t0\t\t\tPass\t0.5\n");
        assert!(matches!(
            load(&text),
            Err(LoadError::MalformedRow { row: 2, .. })
        ));
    }

    #[test]
    fn test_repeated_contig_in_one_row_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t2\tc1, c1\t100, 200\tPass\t0.5\n");
        match load(&text) {
            Err(LoadError::DuplicateContig {
                contig,
                first_bin,
                second_bin,
            }) => {
                assert_eq!(contig, "c1");
                assert_eq!(first_bin, "bin.1");
                assert_eq!(second_bin, "bin.1");
            }
            other => panic!("expected duplicate contig, got {:?}", other),
        }
    }

    #[test]
    fn test_contig_names_split_on_comma_space() {
        let text = format!("{HEADER}bin.1\t95.0\t1.0\t2\tk141,7, c2\t100, 200\tPass\t0.5\n");
        let registry = load(&text).unwrap();
        let bin = registry.get("bin.1").unwrap();
        assert!(bin.has_contig("k141,7"));
        assert_eq!(bin.contig_number(), 2);
        assert_eq!(bin.completeness.to_string(), "95.0");
        assert_eq!(bin.contamination.to_string(), "1.0");
    }

    #[test]
    fn test_missing_column_fails() {
        let text = format!("{HEADER}bin.1\t95.5\t1.2\t2\tc1, c2\n");
        assert!(matches!(load(&text), Err(LoadError::Csv { row: 2, .. })));
    }

    #[test]
    fn test_duplicate_contig_fails() {
        let text = format!(
            "{HEADER}bin.1\t95.5\t1.2\t1\tc1\t100\tPass\t0.5\n\
             bin.2\t90.0\t1.0\t1\tc1\t100\tPass\t0.5\n"
        );
        match load(&text) {
            Err(LoadError::DuplicateContig {
                contig,
                first_bin,
                second_bin,
            }) => {
                assert_eq!(contig, "c1");
                assert_eq!(first_bin, "bin.1");
                assert_eq!(second_bin, "bin.2");
            }
            other => panic!("expected duplicate contig error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_bin_fails() {
        let text = format!(
            "{HEADER}bin.1\t95.5\t1.2\t1\tc1\t100\tPass\t0.5\n\
             bin.1\t90.0\t1.0\t1\tc2\t100\tPass\t0.5\n"
        );
        assert!(matches!(load(&text), Err(LoadError::DuplicateBin(_))));
    }
}
