//! One allergenic protein component and its resolution methods.

use super::embedding::{EmbeddingKind, EmbeddingMatrix};
use super::error::Error;
use super::structure::{SasaOptions, Structure};
use crate::proteome::Proteome;
use crate::search::{HitTable, Program};
use std::collections::BTreeMap;

/// Matched homologs for one allergen context.
///
/// The variant records whether full subject sequences were fetched or only
/// accession identifiers were kept.
#[derive(Debug, Clone, PartialEq)]
pub enum HomologMatches {
    /// Best-hit accessions only.
    Accessions(Vec<String>),
    /// Best-hit accessions with their full proteome sequences.
    Sequences(BTreeMap<String, String>),
}

impl HomologMatches {
    /// Accession identifiers, regardless of variant.
    pub fn accessions(&self) -> Vec<&str> {
        match self {
            HomologMatches::Accessions(accs) => accs.iter().map(String::as_str).collect(),
            HomologMatches::Sequences(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// A discrete allergenic protein unit.
///
/// Owns its sequence, optional structure, and optional per-residue
/// embeddings exclusively. `homologs` accumulates resolution results keyed by
/// allergen-context name; each [`get_homologs`](Self::get_homologs) call
/// replaces the entry for its context, so re-resolution is idempotent.
#[derive(Debug, Clone, Default)]
pub struct Component {
    /// Unique identifier.
    pub name: String,
    /// Amino-acid sequence, one-letter codes.
    pub sequence: String,
    /// Optional 3-D coordinate set.
    pub structure: Option<Structure>,
    /// Optional residue-level ESM2 embedding.
    pub esm2_embed: Option<EmbeddingMatrix>,
    /// Optional structure-aware ESM3 embedding.
    pub esm3_embed: Option<EmbeddingMatrix>,
    /// Context name → matched homologs.
    pub homologs: BTreeMap<String, HomologMatches>,
    /// Full containing reference sequences, set by
    /// [`get_full_seq`](Self::get_full_seq).
    pub full_seq: Option<Vec<String>>,
}

impl Component {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            ..Self::default()
        }
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Binds a per-residue embedding matrix, validating its row count.
    ///
    /// ESM2 rows must equal the sequence length. ESM3 is structure-aware, so
    /// its rows may instead equal the bound structure's residue count.
    ///
    /// # Errors
    ///
    /// [`Error::EmbeddingShape`] on a row-count mismatch.
    pub fn set_embedding(
        &mut self,
        kind: EmbeddingKind,
        matrix: EmbeddingMatrix,
    ) -> Result<(), Error> {
        let rows = matrix.nrows();
        let seq_len = self.sequence.len();
        let structure_len = self.structure.as_ref().map(Structure::residue_count);

        let accepted = match kind {
            EmbeddingKind::Esm2 => rows == seq_len,
            EmbeddingKind::Esm3 => rows == seq_len || structure_len == Some(rows),
        };
        if !accepted {
            let expected = match (kind, structure_len) {
                (EmbeddingKind::Esm3, Some(n)) if n != seq_len => {
                    format!("{seq_len} (sequence) or {n} (structure residues)")
                }
                _ => format!("{seq_len} (sequence)"),
            };
            return Err(Error::EmbeddingShape {
                component: self.name.clone(),
                kind,
                rows,
                expected,
            });
        }

        match kind {
            EmbeddingKind::Esm2 => self.esm2_embed = Some(matrix),
            EmbeddingKind::Esm3 => self.esm3_embed = Some(matrix),
        }
        Ok(())
    }

    /// The bound embedding of the given kind.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEmbedding`] if none is bound.
    pub fn embedding(&self, kind: EmbeddingKind) -> Result<&EmbeddingMatrix, Error> {
        let slot = match kind {
            EmbeddingKind::Esm2 => &self.esm2_embed,
            EmbeddingKind::Esm3 => &self.esm3_embed,
        };
        slot.as_ref().ok_or_else(|| Error::MissingEmbedding {
            component: self.name.clone(),
            kind,
        })
    }

    /// Resolves this component's closest homologs in another organism's
    /// proteome.
    ///
    /// Queries the context's search index with the program matching its
    /// database type, keeps **every** hit tied for the maximum bit-score, and
    /// fetches the full subject sequences from the context's proteome. The
    /// result is stored under `homologs[context.name]`, replacing any prior
    /// entry for that context.
    ///
    /// With `return_sequences` false only accession identifiers are kept.
    ///
    /// # Errors
    ///
    /// - [`Error::NoHitsFound`] on an empty hit table
    /// - [`Error::Search`] if the query itself fails
    /// - [`Error::Proteome`] if a matched accession cannot be fetched
    pub fn get_homologs(
        &mut self,
        context: &super::ResolveContext<'_>,
        return_sequences: bool,
    ) -> Result<&HomologMatches, Error> {
        let program = Program::for_db(context.search_index.db_type());
        let table = context.search_index.query_table(&self.sequence, program)?;
        self.resolve_homologs_from(context.name, &table, context.proteome, return_sequences)
    }

    /// Applies the best-hit selection policy to an already-obtained table.
    ///
    /// This is the selection step of [`get_homologs`](Self::get_homologs),
    /// split out so callers holding a hit table (or tests) can exercise it
    /// without a live search installation.
    pub fn resolve_homologs_from(
        &mut self,
        context_name: &str,
        table: &HitTable,
        proteome: &dyn Proteome,
        return_sequences: bool,
    ) -> Result<&HomologMatches, Error> {
        let accessions = self.select_best(context_name, table)?;
        let matches = if return_sequences {
            let mut sequences = BTreeMap::new();
            for accession in accessions {
                sequences.insert(accession.clone(), proteome.fetch(&accession)?);
            }
            HomologMatches::Sequences(sequences)
        } else {
            HomologMatches::Accessions(accessions)
        };
        self.homologs.insert(context_name.to_string(), matches);
        Ok(&self.homologs[context_name])
    }

    /// Resolves the full reference sequences containing this component.
    ///
    /// Same best-hit selection policy as [`get_homologs`](Self::get_homologs),
    /// but the fetched sequences are stored as a flat list on the component
    /// (`full_seq`) rather than under a context name; used when only the
    /// containing sequence in the component's own proteome is needed.
    pub fn get_full_seq(
        &mut self,
        context: &super::ResolveContext<'_>,
    ) -> Result<&[String], Error> {
        let program = Program::for_db(context.search_index.db_type());
        let table = context.search_index.query_table(&self.sequence, program)?;
        let accessions = self.select_best(context.name, &table)?;
        let mut sequences = Vec::with_capacity(accessions.len());
        for accession in &accessions {
            sequences.push(context.proteome.fetch(accession)?);
        }
        self.full_seq = Some(sequences);
        Ok(self.full_seq.as_deref().unwrap_or(&[]))
    }

    /// Per-residue solvent-accessible surface area of the bound structure.
    ///
    /// # Errors
    ///
    /// [`Error::MissingStructure`] if no structure is bound.
    pub fn get_sasa(&self, options: &SasaOptions) -> Result<Vec<f64>, Error> {
        let structure = self
            .structure
            .as_ref()
            .ok_or_else(|| Error::MissingStructure(self.name.clone()))?;
        Ok(structure.sasa(options))
    }

    fn select_best(&self, context_name: &str, table: &HitTable) -> Result<Vec<String>, Error> {
        if table.is_empty() {
            return Err(Error::NoHitsFound {
                component: self.name.clone(),
                context: context_name.to_string(),
            });
        }
        Ok(table
            .best_accessions()
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proteome::InMemoryProteome;
    use ndarray::Array2;

    fn table(rows: &[(&str, f64)]) -> HitTable {
        let text: String = rows
            .iter()
            .map(|(acc, bits)| {
                format!("query\t{acc}\t100.000\t40\t0\t0\t1\t40\t1\t40\t1e-20\t{bits}\n")
            })
            .collect();
        HitTable::parse(&text).unwrap()
    }

    fn proteome() -> InMemoryProteome {
        [("ACC1", "MKTAYIAKQR"), ("ACC2", "GSHMRGSARA"), ("ACC3", "MKTAYIAKQR")]
            .into_iter()
            .collect()
    }

    #[test]
    fn homologs_keep_all_bit_score_ties() {
        let mut component = Component::new("Cor_a_9", "MKTAYIAKQR");
        let table = table(&[("ACC1", 85.5), ("ACC2", 60.0), ("ACC3", 85.5)]);
        let matches = component
            .resolve_homologs_from("hazelnut", &table, &proteome(), true)
            .unwrap();
        assert_eq!(matches.accessions(), vec!["ACC1", "ACC3"]);
        match matches {
            HomologMatches::Sequences(map) => {
                assert_eq!(map["ACC1"], "MKTAYIAKQR");
                assert_eq!(map["ACC3"], "MKTAYIAKQR");
            }
            other => panic!("expected sequences, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_idempotent_per_context() {
        let mut component = Component::new("Cor_a_9", "MKTAYIAKQR");
        let store = proteome();
        component
            .resolve_homologs_from("hazelnut", &table(&[("ACC1", 85.5)]), &store, true)
            .unwrap();
        component
            .resolve_homologs_from("hazelnut", &table(&[("ACC2", 90.0)]), &store, true)
            .unwrap();
        assert_eq!(component.homologs.len(), 1);
        assert_eq!(component.homologs["hazelnut"].accessions(), vec!["ACC2"]);
    }

    #[test]
    fn accession_only_resolution_skips_sequence_fetch() {
        let mut component = Component::new("Cor_a_9", "MKTAYIAKQR");
        // Empty proteome: a fetch would fail, so success proves none happened.
        let empty = InMemoryProteome::new();
        let matches = component
            .resolve_homologs_from("hazelnut", &table(&[("ACC1", 85.5)]), &empty, false)
            .unwrap();
        assert_eq!(matches, &HomologMatches::Accessions(vec!["ACC1".to_string()]));
    }

    #[test]
    fn empty_table_is_no_hits_found() {
        let mut component = Component::new("Cor_a_9", "MKTAYIAKQR");
        let err = component
            .resolve_homologs_from("hazelnut", &HitTable::default(), &proteome(), true)
            .unwrap_err();
        assert!(matches!(err, Error::NoHitsFound { component, context }
            if component == "Cor_a_9" && context == "hazelnut"));
    }

    #[test]
    fn esm2_embedding_must_match_sequence_length() {
        let mut component = Component::new("Cor_a_9", "MKTAYIAKQR");
        let bad = Array2::<f32>::zeros((7, 16));
        let err = component.set_embedding(EmbeddingKind::Esm2, bad).unwrap_err();
        assert!(matches!(err, Error::EmbeddingShape { rows: 7, .. }));

        let good = Array2::<f32>::zeros((10, 16));
        component.set_embedding(EmbeddingKind::Esm2, good).unwrap();
        assert!(component.esm2_embed.is_some());
    }

    #[test]
    fn esm3_embedding_may_match_structure_length() {
        use crate::model::structure::{Atom, Structure};
        // 10-residue sequence, 2-residue structure fragment.
        let structure = Structure::new(vec![
            Atom::new("CA", "C", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            Atom::new("CA", "C", "GLY", 'A', 2, [3.8, 0.0, 0.0]),
        ]);
        let mut component = Component::new("Cor_a_9", "MKTAYIAKQR").with_structure(structure);
        component
            .set_embedding(EmbeddingKind::Esm3, Array2::<f32>::zeros((2, 16)))
            .unwrap();
        let err = component
            .set_embedding(EmbeddingKind::Esm3, Array2::<f32>::zeros((5, 16)))
            .unwrap_err();
        assert!(matches!(err, Error::EmbeddingShape { .. }));
    }

    #[test]
    fn missing_embedding_and_structure_are_reported() {
        let component = Component::new("Cor_a_9", "MKTAYIAKQR");
        assert!(matches!(
            component.embedding(EmbeddingKind::Esm2),
            Err(Error::MissingEmbedding { .. })
        ));
        assert!(matches!(
            component.get_sasa(&SasaOptions::default()),
            Err(Error::MissingStructure(_))
        ));
    }
}
