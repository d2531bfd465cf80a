//! In-memory atomic coordinate sets.
//!
//! Structures arrive already parsed (PDB-style records are an external
//! collaborator's concern); this module only models the coordinates and the
//! per-residue computations the core needs, including Shrake–Rupley
//! solvent-accessible surface area.

use std::f64::consts::PI;

/// One atom of a parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name (e.g. "CA", "N").
    pub name: String,
    /// Element symbol (e.g. "C", "N", "O").
    pub element: String,
    /// Residue name (e.g. "ALA").
    pub res_name: String,
    /// Chain identifier.
    pub chain: char,
    /// Residue sequence number.
    pub res_seq: i32,
    /// Cartesian position in Å.
    pub pos: [f64; 3],
}

impl Atom {
    pub fn new(
        name: impl Into<String>,
        element: impl Into<String>,
        res_name: impl Into<String>,
        chain: char,
        res_seq: i32,
        pos: [f64; 3],
    ) -> Self {
        Self {
            name: name.into(),
            element: element.into(),
            res_name: res_name.into(),
            chain,
            res_seq,
            pos,
        }
    }

    /// Van der Waals radius in Å (Bondi set, common biomolecular elements).
    fn vdw_radius(&self) -> f64 {
        match self.element.as_str() {
            "H" => 1.20,
            "C" => 1.70,
            "N" => 1.55,
            "O" => 1.52,
            "S" => 1.80,
            "P" => 1.80,
            _ => 1.70,
        }
    }
}

/// Settings for solvent-accessible surface area computation.
#[derive(Debug, Clone, Copy)]
pub struct SasaOptions {
    /// Solvent probe radius in Å; 1.4 approximates water.
    pub probe_radius: f64,
    /// Test points per atom sphere; more points, smoother surface.
    pub n_points: usize,
}

impl Default for SasaOptions {
    fn default() -> Self {
        Self {
            probe_radius: 1.4,
            n_points: 100,
        }
    }
}

/// A 3-D atomic coordinate set, one or more atoms per residue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub atoms: Vec<Atom>,
}

impl Structure {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// All atom positions, in atom order.
    pub fn coords(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.pos).collect()
    }

    /// Atom index ranges of consecutive residues, in order of appearance.
    ///
    /// A residue is a maximal run of atoms sharing chain and residue number.
    pub fn residue_ranges(&self) -> Vec<std::ops::Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for i in 1..=self.atoms.len() {
            let boundary = i == self.atoms.len() || {
                let (a, b) = (&self.atoms[i - 1], &self.atoms[i]);
                a.chain != b.chain || a.res_seq != b.res_seq
            };
            if boundary && i > start {
                ranges.push(start..i);
                start = i;
            }
        }
        ranges
    }

    /// Number of residues.
    pub fn residue_count(&self) -> usize {
        self.residue_ranges().len()
    }

    /// Geometric center of each residue, in residue order.
    pub fn residue_centroids(&self) -> Vec<[f64; 3]> {
        self.residue_ranges()
            .into_iter()
            .map(|range| {
                let n = range.len() as f64;
                let mut c = [0.0; 3];
                for atom in &self.atoms[range] {
                    for k in 0..3 {
                        c[k] += atom.pos[k];
                    }
                }
                [c[0] / n, c[1] / n, c[2] / n]
            })
            .collect()
    }

    /// Per-residue solvent-accessible surface area (Å²), Shrake–Rupley.
    ///
    /// Test points are distributed on each atom's solvent-expanded sphere by
    /// a golden-section spiral; a point is accessible if it lies outside
    /// every other atom's expanded sphere.
    pub fn sasa(&self, options: &SasaOptions) -> Vec<f64> {
        let sphere = unit_sphere_points(options.n_points);
        let radii: Vec<f64> = self
            .atoms
            .iter()
            .map(|a| a.vdw_radius() + options.probe_radius)
            .collect();

        let mut atom_areas = vec![0.0; self.atoms.len()];
        for (i, atom) in self.atoms.iter().enumerate() {
            let r_i = radii[i];
            // Only spheres that can overlap this one matter.
            let neighbors: Vec<usize> = (0..self.atoms.len())
                .filter(|&j| {
                    j != i && distance(atom.pos, self.atoms[j].pos) < r_i + radii[j]
                })
                .collect();

            let mut accessible = 0usize;
            for p in &sphere {
                let point = [
                    atom.pos[0] + p[0] * r_i,
                    atom.pos[1] + p[1] * r_i,
                    atom.pos[2] + p[2] * r_i,
                ];
                let buried = neighbors
                    .iter()
                    .any(|&j| distance(point, self.atoms[j].pos) < radii[j]);
                if !buried {
                    accessible += 1;
                }
            }
            atom_areas[i] =
                4.0 * PI * r_i * r_i * accessible as f64 / options.n_points as f64;
        }

        self.residue_ranges()
            .into_iter()
            .map(|range| atom_areas[range].iter().sum())
            .collect()
    }
}

/// Evenly distributed points on the unit sphere (golden-section spiral).
fn unit_sphere_points(n: usize) -> Vec<[f64; 3]> {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    (0..n)
        .map(|k| {
            let y = 1.0 - 2.0 * (k as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let phi = golden_angle * k as f64;
            [r * phi.cos(), y, r * phi.sin()]
        })
        .collect()
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
