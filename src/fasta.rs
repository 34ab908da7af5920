use std::{fs::File, io::BufReader, path::Path};

use flate2::read::GzDecoder;
use seq_io::fasta::{Reader, Record};

use crate::types::ContigList;

/// Reads contig names and sequence lengths from a plain or gzipped FASTA file.
pub fn read_fasta<P>(path: P) -> anyhow::Result<ContigList>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = File::open(path)?;
    let buf_reader: Box<dyn std::io::BufRead> = if path.extension().is_some_and(|ext| ext == "gz")
    {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut reader = Reader::new(buf_reader);
    let mut contigs = ContigList::default();

    while let Some(record) = reader.next() {
        let record = record?;

        let id = record.id()?;
        let seq_length: usize = record.seq_lines().map(<[u8]>::len).sum();
        contigs.push(id, seq_length as u64);
    }

    Ok(contigs)
}
