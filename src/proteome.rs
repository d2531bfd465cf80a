//! Random-access proteome stores.
//!
//! Homolog resolution needs the full subject sequence for each matched
//! accession, not just the aligned fragment the search engine reports.
//! [`Proteome`] is the keyed-lookup seam; [`IndexedFasta`] serves an indexed
//! FASTA file (`.fai` sidecar) and [`InMemoryProteome`] backs tests and small
//! reference sets.

use bio::io::fasta;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open proteome '{path}': {detail}")]
    Open {
        path: PathBuf,
        detail: String,
    },

    #[error("accession '{0}' not found in the proteome")]
    AccessionNotFound(String),

    #[error("sequence for accession '{0}' is not valid UTF-8")]
    InvalidSequence(String),
}

/// Keyed lookup of a full sequence by accession identifier.
pub trait Proteome {
    /// Fetches the complete sequence stored under `accession`.
    ///
    /// # Errors
    ///
    /// [`Error::AccessionNotFound`] if the store has no such entry.
    fn fetch(&self, accession: &str) -> Result<String, Error>;
}

/// Indexed FASTA access (requires a `.fai` index next to the file).
///
/// The underlying reader seeks on fetch, so it sits behind a `RefCell`; this
/// matches the crate's single-threaded blocking model.
pub struct IndexedFasta {
    path: PathBuf,
    reader: RefCell<fasta::IndexedReader<File>>,
}

impl IndexedFasta {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let reader = fasta::IndexedReader::from_file(&path).map_err(|e| Error::Open {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        Ok(Self {
            path,
            reader: RefCell::new(reader),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Proteome for IndexedFasta {
    fn fetch(&self, accession: &str) -> Result<String, Error> {
        let mut reader = self.reader.borrow_mut();
        reader
            .fetch_all(accession)
            .map_err(|_| Error::AccessionNotFound(accession.to_string()))?;
        let mut sequence = Vec::new();
        reader
            .read(&mut sequence)
            .map_err(|_| Error::AccessionNotFound(accession.to_string()))?;
        String::from_utf8(sequence).map_err(|_| Error::InvalidSequence(accession.to_string()))
    }
}

/// In-memory accession → sequence map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProteome {
    sequences: BTreeMap<String, String>,
}

impl InMemoryProteome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, accession: impl Into<String>, sequence: impl Into<String>) {
        self.sequences.insert(accession.into(), sequence.into());
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl<A: Into<String>, S: Into<String>> FromIterator<(A, S)> for InMemoryProteome {
    fn from_iter<T: IntoIterator<Item = (A, S)>>(iter: T) -> Self {
        Self {
            sequences: iter
                .into_iter()
                .map(|(a, s)| (a.into(), s.into()))
                .collect(),
        }
    }
}

impl Proteome for InMemoryProteome {
    fn fetch(&self, accession: &str) -> Result<String, Error> {
        self.sequences
            .get(accession)
            .cloned()
            .ok_or_else(|| Error::AccessionNotFound(accession.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_fetch_returns_the_stored_sequence() {
        let proteome: InMemoryProteome =
            [("ACC1", "MKTAYIAK"), ("ACC2", "GSHMRGSA")].into_iter().collect();
        assert_eq!(proteome.fetch("ACC1").unwrap(), "MKTAYIAK");
        assert_eq!(proteome.fetch("ACC2").unwrap(), "GSHMRGSA");
    }

    #[test]
    fn missing_accession_is_reported() {
        let proteome = InMemoryProteome::new();
        let err = proteome.fetch("ACC9").unwrap_err();
        assert!(matches!(err, Error::AccessionNotFound(acc) if acc == "ACC9"));
    }

    #[test]
    fn missing_fasta_index_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("proteome.faa");
        std::fs::write(&fasta, ">ACC1\nMKT\n").unwrap();
        // No .fai sidecar was written.
        assert!(matches!(IndexedFasta::open(&fasta), Err(Error::Open { .. })));
    }
}
