//! Rigid-body structural superposition and RMSD.

use super::error::Error;
use crate::model::Structure;
use nalgebra::{Matrix3, Vector3, SVD};
use ndarray::Array2;

/// A rigid-body transform: `x ↦ R·x + t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Applies the transform to a point.
    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let v = self.rotation * Vector3::new(p[0], p[1], p[2]) + self.translation;
        [v.x, v.y, v.z]
    }

    /// True if the transform is the identity within `tolerance` per entry.
    pub fn is_identity(&self, tolerance: f64) -> bool {
        let r = (self.rotation - Matrix3::identity()).abs();
        r.iter().all(|&e| e < tolerance) && self.translation.iter().all(|&e| e.abs() < tolerance)
    }
}

/// Result of superposing a mobile structure onto a reference.
#[derive(Debug, Clone)]
pub struct StructuralAlignment {
    /// The mobile structure after applying the transform.
    pub transformed: Structure,
    /// The rigid-body transform that was applied.
    pub transform: Transform,
    /// Root-mean-square deviation between reference and transformed
    /// coordinates, in Å.
    pub rmsd: f64,
}

/// Superposes `mobile` onto `reference` by least-squares optimal rotation and
/// translation (Kabsch, SVD-based, reflection-corrected).
///
/// The structures must have identical atom counts: superposition assumes a
/// one-to-one correspondence in atom order, and the caller pre-aligns residue
/// correspondence (e.g. from a sequence alignment) when the structures
/// differ. Superposing a structure onto a copy of itself yields an identity
/// transform and an RMSD of zero up to floating-point error.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] on differing atom counts or empty inputs
/// - [`Error::Numerical`] if the rotation SVD fails to converge
pub fn superpose(reference: &Structure, mobile: &Structure) -> Result<StructuralAlignment, Error> {
    let p = mobile.coords();
    let q = reference.coords();
    if p.len() != q.len() || p.is_empty() {
        return Err(Error::DimensionMismatch {
            left: q.len(),
            right: p.len(),
        });
    }

    let centroid_p = centroid(&p);
    let centroid_q = centroid(&q);

    // Covariance of the centered point sets: H = Σ p_c · q_cᵀ.
    let mut h = Matrix3::<f64>::zeros();
    for (pi, qi) in p.iter().zip(&q) {
        let pc = Vector3::new(pi[0], pi[1], pi[2]) - centroid_p;
        let qc = Vector3::new(qi[0], qi[1], qi[2]) - centroid_q;
        h += pc * qc.transpose();
    }

    let svd = SVD::new(h, true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(Error::Numerical("SVD did not converge".to_string())),
    };
    let v = v_t.transpose();

    // Correct an improper rotation (reflection).
    let mut d = Matrix3::identity();
    if (v * u.transpose()).determinant() < 0.0 {
        d[(2, 2)] = -1.0;
    }
    let rotation = v * d * u.transpose();
    let translation = centroid_q - rotation * centroid_p;
    let transform = Transform {
        rotation,
        translation,
    };

    let mut transformed = mobile.clone();
    for atom in &mut transformed.atoms {
        atom.pos = transform.apply(atom.pos);
    }

    let rmsd = rmsd_raw(&transformed.coords(), &q);

    Ok(StructuralAlignment {
        transformed,
        transform,
        rmsd,
    })
}

/// RMSD between two structures in their current frames (no superposition).
///
/// # Errors
///
/// [`Error::DimensionMismatch`] on differing atom counts or empty inputs.
pub fn rmsd(a: &Structure, b: &Structure) -> Result<f64, Error> {
    let ca = a.coords();
    let cb = b.coords();
    if ca.len() != cb.len() || ca.is_empty() {
        return Err(Error::DimensionMismatch {
            left: ca.len(),
            right: cb.len(),
        });
    }
    Ok(rmsd_raw(&ca, &cb))
}

/// Pairwise distances between residue centroids of two structures.
///
/// `result[[i, j]]` is the distance from residue `i` of `a` to residue `j`
/// of `b`, a localized divergence map for structures already in a common
/// frame (superpose first).
pub fn residue_distance_matrix(a: &Structure, b: &Structure) -> Array2<f64> {
    let ca = a.residue_centroids();
    let cb = b.residue_centroids();
    let mut out = Array2::<f64>::zeros((ca.len(), cb.len()));
    for (i, p) in ca.iter().enumerate() {
        for (j, q) in cb.iter().enumerate() {
            let d = [p[0] - q[0], p[1] - q[1], p[2] - q[2]];
            out[[i, j]] = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        }
    }
    out
}

fn centroid(points: &[[f64; 3]]) -> Vector3<f64> {
    let mut c = Vector3::zeros();
    for p in points {
        c += Vector3::new(p[0], p[1], p[2]);
    }
    c / points.len() as f64
}

fn rmsd_raw(a: &[[f64; 3]], b: &[[f64; 3]]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(p, q)| {
            let d = [p[0] - q[0], p[1] - q[1], p[2] - q[2]];
            d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
        })
        .sum();
    (sum / a.len() as f64).sqrt()
}
