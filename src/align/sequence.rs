//! Substitution-matrix scored sequence alignment and pairwise distances.

use super::error::Error;
use crate::model::Component;
use bio::alignment::pairwise::Aligner;
use bio::alignment::Alignment;
use bio::scores::blosum62::blosum62;
use ndarray::Array2;

/// A substitution-matrix scoring function over amino-acid bytes.
pub type ScoreFn = fn(u8, u8) -> i32;

/// Immutable scoring configuration for sequence alignment.
///
/// Passed explicitly at construction rather than read from ambient state, so
/// two aligners with different matrices can coexist.
#[derive(Debug, Clone, Copy)]
pub struct ScoringScheme {
    /// Penalty for opening a gap (negative).
    pub gap_open: i32,
    /// Penalty for extending a gap by one position (negative).
    pub gap_extend: i32,
    /// Substitution matrix.
    pub matrix: ScoreFn,
}

impl Default for ScoringScheme {
    /// BLOSUM62 with the standard `blastp` gap penalties (−11/−1).
    fn default() -> Self {
        Self {
            gap_open: -11,
            gap_extend: -1,
            matrix: blosum62,
        }
    }
}

/// One aligned pair within a multi-sequence comparison.
#[derive(Debug, Clone)]
pub struct PairAlignment {
    /// Index of the first sequence in the input order.
    pub i: usize,
    /// Index of the second sequence in the input order.
    pub j: usize,
    /// Global alignment under the aligner's scoring scheme.
    pub alignment: Alignment,
}

/// Result of aligning a sequence collection.
///
/// `distances[[i, j]]` is the substitution-matrix-derived distance between
/// inputs `i` and `j`: `1 − 2·S(i,j) / (S(i,i) + S(j,j))`, clamped at zero,
/// where `S` is the global alignment score and the diagonal terms are
/// gap-free self-scores. Identical sequences are at distance zero. Input
/// order is preserved in the matrix indexing.
#[derive(Debug, Clone)]
pub struct MsaResult {
    /// Input names, in input order.
    pub names: Vec<String>,
    /// All pairwise alignments, `i < j`.
    pub pairs: Vec<PairAlignment>,
    /// Symmetric distance matrix, zero diagonal.
    pub distances: Array2<f64>,
}

/// Multi-sequence alignment distance engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceAligner {
    scheme: ScoringScheme,
}

impl SequenceAligner {
    pub fn new(scheme: ScoringScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &ScoringScheme {
        &self.scheme
    }

    /// Aligns the sequences of a component collection.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if fewer than two components are given.
    pub fn align_components(&self, components: &[&Component]) -> Result<MsaResult, Error> {
        let names: Vec<String> = components.iter().map(|c| c.name.clone()).collect();
        let sequences: Vec<&str> = components.iter().map(|c| c.sequence.as_str()).collect();
        self.align_named(names, &sequences)
    }

    /// Aligns raw sequences under the configured scoring scheme.
    pub fn align_named(
        &self,
        names: Vec<String>,
        sequences: &[&str],
    ) -> Result<MsaResult, Error> {
        if sequences.len() < 2 {
            return Err(Error::EmptyInput {
                required: 2,
                got: sequences.len(),
            });
        }

        let n = sequences.len();
        let self_scores: Vec<f64> = sequences
            .iter()
            .map(|s| self.self_score(s.as_bytes()) as f64)
            .collect();

        let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
        let mut distances = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let x = sequences[i].as_bytes();
                let y = sequences[j].as_bytes();
                let mut aligner = Aligner::with_capacity(
                    x.len(),
                    y.len(),
                    self.scheme.gap_open,
                    self.scheme.gap_extend,
                    self.scheme.matrix,
                );
                let alignment = aligner.global(x, y);
                let distance = pair_distance(
                    alignment.score as f64,
                    self_scores[i],
                    self_scores[j],
                );
                distances[[i, j]] = distance;
                distances[[j, i]] = distance;
                pairs.push(PairAlignment { i, j, alignment });
            }
        }

        Ok(MsaResult {
            names,
            pairs,
            distances,
        })
    }

    /// Gap-free self-alignment score, the normalization reference for
    /// pairwise distances.
    fn self_score(&self, sequence: &[u8]) -> i64 {
        sequence
            .iter()
            .map(|&c| (self.scheme.matrix)(c, c) as i64)
            .sum()
    }
}

fn pair_distance(score: f64, self_i: f64, self_j: f64) -> f64 {
    let denom = self_i + self_j;
    if denom <= 0.0 {
        return 0.0;
    }
    (1.0 - 2.0 * score / denom).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(sequences: &[&str]) -> MsaResult {
        let names = (0..sequences.len()).map(|i| format!("seq{i}")).collect();
        SequenceAligner::default()
            .align_named(names, sequences)
            .unwrap()
    }

    #[test]
    fn identical_sequences_are_at_distance_zero() {
        let msa = result(&["MKTAYIAKQR", "MKTAYIAKQR"]);
        assert_eq!(msa.distances[[0, 1]], 0.0);
        assert_eq!(msa.distances[[0, 0]], 0.0);
    }

    #[test]
    fn diverged_sequences_are_farther_than_similar_ones() {
        let msa = result(&["MKTAYIAKQR", "MKTAYIAKQW", "GGGGGGGGGG"]);
        let near = msa.distances[[0, 1]];
        let far = msa.distances[[0, 2]];
        assert!(near > 0.0);
        assert!(far > near);
    }

    #[test]
    fn distance_matrix_is_symmetric_and_order_preserving() {
        let msa = result(&["MKTAYIAKQR", "GSHMRGSARA", "MKTAYIAKQW"]);
        assert_eq!(msa.names, vec!["seq0", "seq1", "seq2"]);
        assert_eq!(msa.distances.nrows(), 3);
        for i in 0..3 {
            assert_eq!(msa.distances[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(msa.distances[[i, j]], msa.distances[[j, i]]);
            }
        }
        // Three inputs, three pairs.
        assert_eq!(msa.pairs.len(), 3);
        assert_eq!((msa.pairs[0].i, msa.pairs[0].j), (0, 1));
    }

    #[test]
    fn fewer_than_two_inputs_is_an_error() {
        let err = SequenceAligner::default()
            .align_named(vec!["only".to_string()], &["MKT"])
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput { required: 2, got: 1 }));
    }

    #[test]
    fn components_align_in_input_order() {
        let a = Component::new("Cor_a_9", "MKTAYIAKQR");
        let b = Component::new("Ara_h_2", "MKTAYIAKQR");
        let msa = SequenceAligner::default()
            .align_components(&[&a, &b])
            .unwrap();
        assert_eq!(msa.names, vec!["Cor_a_9", "Ara_h_2"]);
        assert_eq!(msa.distances[[0, 1]], 0.0);
    }
}
