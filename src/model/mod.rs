//! Core entities the similarity engine operates on.
//!
//! - [`Component`] – One allergenic protein unit: sequence, optional
//!   structure, optional learned embeddings, accumulated homolog matches.
//! - [`Allergen`] – The owning context: a component collection, the search
//!   index built from the organism's proteome, and the proteome itself.
//! - [`Structure`] – Parsed atomic coordinate sets and per-residue surface
//!   computations.
//! - [`EmbeddingMatrix`] – Per-residue embedding matrices and their families.
//!
//! Ownership is strictly downward: an [`Allergen`] owns [`Component`]s, and a
//! component owns its own data. Resolution calls receive a transient
//! [`ResolveContext`] view rather than a back-reference.

mod allergen;
mod component;
mod embedding;
mod error;
mod structure;

pub use allergen::{Allergen, ResolveContext};
pub use component::{Component, HomologMatches};
pub use embedding::{EmbeddingKind, EmbeddingMatrix};
pub use error::Error;
pub use structure::{Atom, SasaOptions, Structure};
