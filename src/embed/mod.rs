//! Windowed embedding aggregation and pairwise feature distances.
//!
//! Per-residue embedding matrices are reduced to per-window feature vectors
//! by sliding-window mean pooling ([`split_features`]), then compared with a
//! full pairwise Minkowski distance matrix ([`compare_split_features`]).
//! This is the third similarity signal next to sequence distance and
//! structural RMSD.

use crate::model::{Component, EmbeddingKind};
use ndarray::{Array1, Array2, Axis};
use thiserror::Error as ThisError;

/// Errors raised by embedding aggregation.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The pooling window does not fit the embedding.
    #[error("window {window} (stride {stride}) does not fit an embedding of {rows} residues")]
    InvalidWindow {
        window: usize,
        stride: usize,
        rows: usize,
    },
}

/// Mean-pools overlapping windows along the residue axis.
///
/// An `n × dim` matrix yields `(n − window) / stride + 1` feature vectors of
/// length `dim`; with `stride = 1` that is exactly `n − window + 1`.
///
/// # Errors
///
/// [`Error::InvalidWindow`] if `window` or `stride` is zero or `window`
/// exceeds the residue count.
pub fn split_features(
    embedding: &Array2<f32>,
    window: usize,
    stride: usize,
) -> Result<Array2<f32>, Error> {
    let rows = embedding.nrows();
    if window == 0 || stride == 0 || window > rows {
        return Err(Error::InvalidWindow {
            window,
            stride,
            rows,
        });
    }

    let count = (rows - window) / stride + 1;
    let mut pooled = Array2::<f32>::zeros((count, embedding.ncols()));
    for (k, start) in (0..=rows - window).step_by(stride).enumerate() {
        let mean: Array1<f32> =
            embedding.slice(ndarray::s![start..start + window, ..]).sum_axis(Axis(0))
                / window as f32;
        pooled.row_mut(k).assign(&mean);
    }
    Ok(pooled)
}

/// Pairwise Minkowski distances between two pooled feature sets.
///
/// `result[[i, j]]` is the L-`order` distance between row `i` of `a` and row
/// `j` of `b`; each entry depends only on those two vectors, so
/// `compare_split_features(a, b, p)[[i, j]] ==
/// compare_split_features(b, a, p)[[j, i]]`.
///
/// `order = 2` takes a dedicated path that accumulates explicit squared
/// differences: the generic `|x−y|^p` route is fine for arbitrary orders,
/// but Euclidean distance is the default consumer and the explicit form
/// avoids catastrophic cancellation on near-identical vectors (the failure
/// mode of the `‖x‖² + ‖y‖² − 2·x·y` matrix-multiplication shortcut).
pub fn compare_split_features(a: &Array2<f32>, b: &Array2<f32>, order: f64) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((a.nrows(), b.nrows()));
    for (i, x) in a.rows().into_iter().enumerate() {
        for (j, y) in b.rows().into_iter().enumerate() {
            out[[i, j]] = if order == 2.0 {
                x.iter()
                    .zip(y.iter())
                    .map(|(&xi, &yi)| {
                        let d = xi as f64 - yi as f64;
                        d * d
                    })
                    .sum::<f64>()
                    .sqrt()
            } else {
                x.iter()
                    .zip(y.iter())
                    .map(|(&xi, &yi)| (xi as f64 - yi as f64).abs().powf(order))
                    .sum::<f64>()
                    .powf(1.0 / order)
            };
        }
    }
    out
}

/// Component-level embedding comparator with pooling defaults.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingComparator {
    /// Pooling window length in residues.
    pub window: usize,
    /// Window step.
    pub stride: usize,
    /// Minkowski order for feature distances.
    pub order: f64,
}

impl Default for EmbeddingComparator {
    fn default() -> Self {
        Self {
            window: 8,
            stride: 1,
            order: 2.0,
        }
    }
}

impl EmbeddingComparator {
    /// Pools a matrix with this comparator's window settings.
    pub fn split(&self, embedding: &Array2<f32>) -> Result<Array2<f32>, Error> {
        split_features(embedding, self.window, self.stride)
    }

    /// Distance matrix between the pooled embeddings of two components.
    ///
    /// # Errors
    ///
    /// - [`crate::model::Error::MissingEmbedding`] if either component lacks
    ///   the requested embedding family
    /// - [`Error::InvalidWindow`] via `model::Error` if the window does not
    ///   fit either embedding
    pub fn compare_components(
        &self,
        a: &Component,
        b: &Component,
        kind: EmbeddingKind,
    ) -> Result<Array2<f64>, crate::model::Error> {
        let features_a = self.split(a.embedding(kind)?)?;
        let features_b = self.split(b.embedding(kind)?)?;
        Ok(compare_split_features(&features_a, &features_b, self.order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn stride_one_yields_n_minus_w_plus_one_windows() {
        let embedding = Array2::<f32>::zeros((20, 8));
        for window in 1..=20 {
            let pooled = split_features(&embedding, window, 1).unwrap();
            assert_eq!(pooled.nrows(), 20 - window + 1);
            assert_eq!(pooled.ncols(), 8);
        }
    }

    #[test]
    fn windows_are_mean_pooled() {
        let embedding = array![[0.0_f32, 2.0], [2.0, 4.0], [4.0, 0.0]];
        let pooled = split_features(&embedding, 2, 1).unwrap();
        assert_eq!(pooled, array![[1.0_f32, 3.0], [3.0, 2.0]]);
    }

    #[test]
    fn stride_skips_window_starts() {
        let embedding = Array2::<f32>::zeros((10, 4));
        let pooled = split_features(&embedding, 4, 3).unwrap();
        // Starts at rows 0, 3, 6.
        assert_eq!(pooled.nrows(), 3);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let embedding = Array2::<f32>::zeros((5, 4));
        assert!(matches!(
            split_features(&embedding, 6, 1),
            Err(Error::InvalidWindow { window: 6, rows: 5, .. })
        ));
        assert!(split_features(&embedding, 0, 1).is_err());
        assert!(split_features(&embedding, 3, 0).is_err());
    }

    #[test]
    fn euclidean_distances_match_the_generic_path() {
        let a = array![[0.0_f32, 0.0], [3.0, 4.0]];
        let b = array![[0.0_f32, 0.0], [6.0, 8.0]];
        let d = compare_split_features(&a, &b, 2.0);
        assert_eq!(d[[0, 0]], 0.0);
        assert!((d[[1, 0]] - 5.0).abs() < 1e-12);
        assert!((d[[0, 1]] - 10.0).abs() < 1e-12);
        assert!((d[[1, 1]] - 5.0).abs() < 1e-12);

        // Manhattan distance through the generic Minkowski path.
        let manhattan = compare_split_features(&a, &b, 1.0);
        assert!((manhattan[[1, 0]] - 7.0).abs() < 1e-12);
    }

    #[test]
    fn distance_depends_only_on_the_two_vectors() {
        let a = array![[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0], [0.5, 0.5, 0.5]];
        let b = array![[6.0_f32, 5.0, 4.0], [1.0, 1.0, 1.0]];
        let ab = compare_split_features(&a, &b, 2.0);
        let ba = compare_split_features(&b, &a, 2.0);
        for i in 0..a.nrows() {
            for j in 0..b.nrows() {
                assert_eq!(ab[[i, j]], ba[[j, i]]);
            }
        }
    }

    #[test]
    fn comparator_runs_end_to_end_on_components() {
        use crate::model::{Component, EmbeddingKind};
        let comparator = EmbeddingComparator {
            window: 3,
            stride: 1,
            order: 2.0,
        };
        let sequence = "MKTAYIAKQR";
        let embedding = Array2::from_shape_fn((sequence.len(), 6), |(i, j)| (i * j) as f32);

        let mut a = Component::new("Cor_a_9", sequence);
        a.set_embedding(EmbeddingKind::Esm2, embedding.clone()).unwrap();
        let mut b = Component::new("Ara_h_2", sequence);
        b.set_embedding(EmbeddingKind::Esm2, embedding).unwrap();

        let distances = comparator
            .compare_components(&a, &b, EmbeddingKind::Esm2)
            .unwrap();
        assert_eq!(distances.dim(), (8, 8));
        for k in 0..8 {
            assert_eq!(distances[[k, k]], 0.0);
        }

        let bare = Component::new("Bet_v_1", sequence);
        assert!(comparator
            .compare_components(&a, &bare, EmbeddingKind::Esm2)
            .is_err());
    }
}
