//! Error types for component-level resolution.

use super::embedding::EmbeddingKind;
use thiserror::Error;

/// Errors raised while resolving homologs, sequences, or per-component data.
#[derive(Debug, Error)]
pub enum Error {
    /// A query expected to find hits returned an empty table.
    ///
    /// Reported rather than treated as zero homologs: an empty table usually
    /// signals a database/query mismatch, not a biological result.
    #[error("no hits found for component '{component}' against context '{context}'")]
    NoHitsFound {
        /// Component whose sequence was queried.
        component: String,
        /// Name of the allergen context that was searched.
        context: String,
    },

    /// The operation requires a structure and none is bound.
    #[error("component '{0}' has no structure bound")]
    MissingStructure(String),

    /// The operation requires an embedding and none is bound.
    #[error("component '{component}' has no {kind} embedding")]
    MissingEmbedding {
        component: String,
        kind: EmbeddingKind,
    },

    /// An embedding matrix does not match the component's residue count.
    #[error("{kind} embedding for component '{component}' has {rows} rows, expected {expected}")]
    EmbeddingShape {
        component: String,
        kind: EmbeddingKind,
        rows: usize,
        expected: String,
    },

    /// Similarity search failed.
    #[error(transparent)]
    Search(#[from] crate::search::Error),

    /// Proteome lookup failed.
    #[error(transparent)]
    Proteome(#[from] crate::proteome::Error),

    /// Embedding comparison failed.
    #[error(transparent)]
    Embed(#[from] crate::embed::Error),
}
