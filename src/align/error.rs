use thiserror::Error;

/// Errors that can occur during sequence or structural alignment.
#[derive(Debug, Error)]
pub enum Error {
    /// The two structures cannot be superposed directly.
    ///
    /// Superposition needs a one-to-one atom correspondence; the caller is
    /// responsible for pre-aligning residue correspondence (e.g. via a
    /// sequence alignment) before calling.
    #[error("structures have incompatible sizes for superposition: {left} vs {right} atoms")]
    DimensionMismatch {
        /// Atom count of the reference structure.
        left: usize,
        /// Atom count of the mobile structure.
        right: usize,
    },

    /// The input collection is empty.
    #[error("alignment requires at least {required} input(s), got {got}")]
    EmptyInput {
        required: usize,
        got: usize,
    },

    /// The optimal rotation could not be computed.
    #[error("superposition failed: {0}")]
    Numerical(String),
}
