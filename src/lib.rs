//! Compare two sets of metagenome-assembled genome bins by contig membership and
//! consolidate them into one bin set.
//!
//! Every bin pair is classified as Identical, Superset/Subset, Mixed (with a
//! High/Medium/Low support tier) or, for bins sharing nothing with the other set,
//! Unique. Mixed bins are then resolved with one of the [`ConsolidationMethod`]s.

pub mod cli;
pub mod compare;
pub mod consolidate;
pub mod copy;
pub mod error;
pub mod fasta;
pub mod filter;
pub mod io;
pub mod mixed;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod types;

pub use consolidate::ConsolidationMethod;
pub use error::LoadError;
pub use registry::Registry;
