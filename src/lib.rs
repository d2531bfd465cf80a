//! A Rust library for allergen cross-reactivity analysis.
//! It resolves the closest homolog of each allergenic protein component in a
//! reference proteome and scores similarity across three independent
//! representations: sequence alignment, structural superposition, and learned
//! per-residue embeddings.
//!
//! # Features
//!
//! - **Homology search** — Wraps a BLAST-family installation: database
//!   construction with `makeblastdb`, query execution with
//!   `blastn`/`blastp`/`blastx`/`tblastn`/`tblastx`, and typed hit-table or
//!   JSON output parsing
//! - **Best-hit resolution** — Component-level homolog and full-sequence
//!   lookup with bit-score ranking; equally-scored hits are all kept rather
//!   than arbitrarily reduced to one
//! - **Sequence distance** — Substitution-matrix scored global alignment
//!   (BLOSUM62 by default) over component sets, with a symmetric pairwise
//!   distance matrix
//! - **Structural distance** — Kabsch rigid-body superposition with RMSD and
//!   per-residue divergence maps; Shrake–Rupley solvent-accessible surface
//!   area
//! - **Embedding distance** — Sliding-window mean pooling of per-residue
//!   embedding matrices and pairwise Minkowski distances between pooled
//!   feature sets
//!
//! # Quick Start
//!
//! Windowed embedding comparison works on any per-residue matrix:
//!
//! ```
//! use cross_react::embed::{compare_split_features, split_features};
//! use ndarray::Array2;
//!
//! // 6 residues, 4-dimensional embedding
//! let embedding = Array2::from_shape_fn((6, 4), |(i, j)| (i + j) as f32);
//!
//! // Mean-pool windows of 3 residues: 6 - 3 + 1 = 4 feature vectors
//! let pooled = split_features(&embedding, 3, 1)?;
//! assert_eq!(pooled.nrows(), 4);
//!
//! // Euclidean distances between every pair of pooled features
//! let distances = compare_split_features(&pooled, &pooled, 2.0);
//! assert_eq!(distances[[0, 0]], 0.0);
//! # Ok::<(), cross_react::embed::Error>(())
//! ```
//!
//! Homolog resolution against another organism's proteome requires a local
//! BLAST installation:
//!
//! ```no_run
//! use cross_react::model::{Allergen, Component};
//! use cross_react::proteome::IndexedFasta;
//! use cross_react::search::{BuildOptions, DbType, SearchIndex};
//!
//! let mut index = SearchIndex::new(DbType::Protein);
//! index.build(&BuildOptions::new("hazelnut/protein.faa", "hazelnut/blast", "blast"))?;
//!
//! let proteome = IndexedFasta::open("hazelnut/protein.faa")?;
//! let hazelnut = Allergen::new("hazelnut", index, Box::new(proteome));
//!
//! let mut component = Component::new("Ara_h_1", "MRGRVSPLMLLLGILVLASVSATHAKSS");
//! let matches = component.get_homologs(&hazelnut.context(), true)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`search`] — BLAST database handle, query execution, hit tables
//! - [`model`] — [`Component`], [`Allergen`] context, [`Structure`]
//! - [`align`] — Sequence and structural alignment engines
//! - [`embed`] — Windowed embedding feature comparison
//! - [`proteome`] — Random-access proteome stores (indexed FASTA, in-memory)

pub mod align;
pub mod embed;
pub mod model;
pub mod proteome;
pub mod search;

pub use model::{Allergen, Component, EmbeddingKind, HomologMatches, ResolveContext};
pub use model::{Atom, SasaOptions, Structure};
pub use search::{
    BuildOptions, DbType, Hit, HitTable, OutputFormat, Program, QueryOptions, QueryOutput,
    SearchIndex,
};

pub use align::{
    superpose, ScoringScheme, SequenceAligner, StructuralAlignment, Transform,
};
pub use embed::{compare_split_features, split_features, EmbeddingComparator};

pub use align::Error as AlignError;
pub use embed::Error as EmbedError;
pub use model::Error as ModelError;
pub use search::Error as SearchError;
