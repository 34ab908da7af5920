use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed quality table row {row}: {source}")]
    Csv {
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed quality table row {row} (bin {bin}): {reason}")]
    MalformedRow { row: u64, bin: String, reason: String },

    #[error("Bin {0} is listed more than once")]
    DuplicateBin(String),

    #[error("Contig {contig} is assigned to both {first_bin} and {second_bin}")]
    DuplicateContig {
        contig: String,
        first_bin: String,
        second_bin: String,
    },
}
