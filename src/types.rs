use std::{collections::BTreeMap, fmt, num::ParseFloatError};

use serde::Deserialize;

/// Which of the two input bin sets a bin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinSet {
    Bins1,
    Bins2,
}

impl BinSet {
    pub fn other(self) -> Self {
        match self {
            BinSet::Bins1 => BinSet::Bins2,
            BinSet::Bins2 => BinSet::Bins1,
        }
    }
}

impl fmt::Display for BinSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinSet::Bins1 => f.write_str("bins1"),
            BinSet::Bins2 => f.write_str("bins2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub length: u64,
    pub bin: String,
}

/// A CheckM2 score that keeps the text it was read from, so `95.0` is written back as `95.0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Score {
    value: f64,
    text: String,
}

impl Score {
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

impl TryFrom<String> for Score {
    type Error = ParseFloatError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let value = text.trim().parse()?;
        Ok(Self { value, text })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A bin that passed quality filtering. Contig membership maps name to length.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub name: String,
    pub contigs: BTreeMap<String, u64>,
    pub completeness: Score,
    pub contamination: Score,
}

impl Bin {
    pub fn new<I, S>(
        name: &str,
        completeness: impl Into<Score>,
        contamination: impl Into<Score>,
        contigs: I,
    ) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            contigs: contigs.into_iter().map(|(c, l)| (c.into(), l)).collect(),
            completeness: completeness.into(),
            contamination: contamination.into(),
        }
    }

    pub fn total_length(&self) -> u64 {
        self.contigs.values().sum()
    }

    pub fn contig_number(&self) -> usize {
        self.contigs.len()
    }

    pub fn has_contig(&self, contig: &str) -> bool {
        self.contigs.contains_key(contig)
    }

    /// Contigs of `self` that are not members of `other`.
    pub fn difference<'a>(&'a self, other: &'a Bin) -> impl Iterator<Item = &'a str> + 'a {
        self.contigs
            .keys()
            .filter(move |c| !other.has_contig(c))
            .map(String::as_str)
    }

    pub fn intersection<'a>(&'a self, other: &'a Bin) -> impl Iterator<Item = &'a str> + 'a {
        self.contigs
            .keys()
            .filter(move |c| other.has_contig(c))
            .map(String::as_str)
    }

    pub fn same_contigs(&self, other: &Bin) -> bool {
        self.contigs.len() == other.contigs.len() && self.contigs.keys().all(|c| other.has_contig(c))
    }

    /// True when every contig of `other` is in `self` and `self` has more contigs.
    pub fn strict_superset_of(&self, other: &Bin) -> bool {
        self.contigs.len() > other.contigs.len() && other.contigs.keys().all(|c| self.has_contig(c))
    }

    /// Collects the named contigs with the lengths this bin records for them.
    pub fn contig_list<'a, I>(&self, names: I) -> ContigList
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut list = ContigList::default();
        for name in names {
            if let Some(len) = self.contigs.get(name) {
                list.push(name, *len);
            }
        }
        list
    }

    pub fn all_contigs(&self) -> ContigList {
        self.contig_list(self.contigs.keys().map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Identical,
    Unique,
    Superset,
    Subset,
    MixedHs,
    MixedMs,
    MixedLs,
    /// The partner side of a one-directional Mixed comparison.
    Reference,
}

impl Category {
    /// Joint overlap tier of a mixed pair from the percent of shared bases of each side.
    pub fn from_shared_percentages(bin1_perc: u32, bin2_perc: u32) -> Self {
        match (bin1_perc, bin2_perc) {
            (80.., 80..) => Category::MixedHs,
            (80.., 50..) => Category::MixedMs,
            (50..=79, 50..) => Category::MixedMs,
            _ => Category::MixedLs,
        }
    }

    pub fn is_mixed(self) -> bool {
        matches!(self, Category::MixedHs | Category::MixedMs | Category::MixedLs)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Identical => "Identical",
            Category::Unique => "Unique",
            Category::Superset => "Superset",
            Category::Subset => "Subset",
            Category::MixedHs => "Mixed-HS",
            Category::MixedMs => "Mixed-MS",
            Category::MixedLs => "Mixed-LS",
            Category::Reference => "reference",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContigList {
    pub names: Vec<String>,
    pub lengths: Vec<u64>,
}

impl ContigList {
    pub fn push(&mut self, name: &str, length: u64) {
        self.names.push(name.to_string());
        self.lengths.push(length);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn total_bases(&self) -> u64 {
        self.lengths.iter().sum()
    }
}

/// One side of a [`MatchRecord`]: a snapshot of the bin plus what the comparison found for it.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSide {
    pub name: String,
    pub category: Category,
    pub contig_number: usize,
    pub completeness: Score,
    pub contamination: Score,
    pub size: u64,
    pub perc_bases_shared: Option<u32>,
    pub unique_contigs: Option<ContigList>,
}

impl BinSide {
    pub fn snapshot(bin: &Bin, category: Category) -> Self {
        Self {
            name: bin.name.clone(),
            category,
            contig_number: bin.contig_number(),
            completeness: bin.completeness.clone(),
            contamination: bin.contamination.clone(),
            size: bin.total_length(),
            perc_bases_shared: None,
            unique_contigs: None,
        }
    }

    pub fn with_perc(mut self, perc: u32) -> Self {
        self.perc_bases_shared = Some(perc);
        self
    }

    pub fn with_unique(mut self, contigs: ContigList) -> Self {
        self.unique_contigs = Some(contigs);
        self
    }
}

/// A classified relationship between a set-1 bin and a set-2 bin.
/// One side is absent for Unique records.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub bin1: Option<BinSide>,
    pub bin2: Option<BinSide>,
    pub shared: Option<ContigList>,
}

impl MatchRecord {
    pub fn key(&self) -> PairKey {
        PairKey {
            bin1: self.bin1.as_ref().map(|s| s.name.clone()),
            bin2: self.bin2.as_ref().map(|s| s.name.clone()),
        }
    }

    pub fn side(&self, set: BinSet) -> Option<&BinSide> {
        match set {
            BinSet::Bins1 => self.bin1.as_ref(),
            BinSet::Bins2 => self.bin2.as_ref(),
        }
    }

    pub fn name(&self, set: BinSet) -> Option<&str> {
        self.side(set).map(|s| s.name.as_str())
    }

    pub fn category(&self, set: BinSet) -> Option<Category> {
        self.side(set).map(|s| s.category)
    }

    /// Copy of this record with the set-2 category replaced by the set-1 category.
    pub fn unified(&self) -> MatchRecord {
        let mut record = self.clone();
        if let (Some(b1), Some(b2)) = (&self.bin1, record.bin2.as_mut()) {
            b2.category = b1.category;
        }
        record
    }
}

/// Structured (bin1, bin2) key; `None` marks the absent side of a Unique record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub bin1: Option<String>,
    pub bin2: Option<String>,
}

impl PairKey {
    pub fn new(bin1: &str, bin2: &str) -> Self {
        Self {
            bin1: Some(bin1.to_string()),
            bin2: Some(bin2.to_string()),
        }
    }
}

pub type MatchTable = BTreeMap<PairKey, MatchRecord>;

pub fn insert_record(table: &mut MatchTable, record: MatchRecord) {
    table.insert(record.key(), record);
}
