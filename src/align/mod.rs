//! Sequence and structural alignment engines.
//!
//! Two independent comparators produce two of the three similarity signals:
//!
//! - [`SequenceAligner`] — substitution-matrix scored global alignment over a
//!   component collection, yielding a symmetric pairwise distance matrix
//! - [`superpose`] — Kabsch rigid-body superposition of two structures,
//!   yielding the transformed structure, the transform, and a scalar RMSD

mod error;
mod sequence;
mod structural;

pub use error::Error;
pub use sequence::{MsaResult, PairAlignment, ScoreFn, ScoringScheme, SequenceAligner};
pub use structural::{residue_distance_matrix, rmsd, superpose, StructuralAlignment, Transform};
