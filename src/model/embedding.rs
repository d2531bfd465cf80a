use ndarray::Array2;
use std::fmt;

/// Per-residue embedding matrix: rows = residues, columns = embedding
/// dimension.
pub type EmbeddingMatrix = Array2<f32>;

/// The embedding family bound to a component.
///
/// ESM2 embeddings are token/residue-level and must match the sequence
/// length exactly. ESM3 embeddings are structure-aware; their row count may
/// instead match the residue count of the bound structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingKind {
    Esm2,
    Esm3,
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingKind::Esm2 => write!(f, "ESM2"),
            EmbeddingKind::Esm3 => write!(f, "ESM3"),
        }
    }
}
