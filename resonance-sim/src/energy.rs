use crate::geometry::Lattice;

/// Nearest-neighbor Ising Hamiltonian with a uniform base field:
/// `H = -J * sum_<ij> s_i s_j - h * sum_i s_i`, plus whatever extra field the
/// caller passes per site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyModel {
    /// Coupling constant J (ferromagnetic when positive).
    pub coupling: f64,
    /// Base external field h.
    pub base_field: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            coupling: 1.0,
            base_field: 0.0,
        }
    }
}

impl EnergyModel {
    pub fn new(coupling: f64, base_field: f64) -> Self {
        Self {
            coupling,
            base_field,
        }
    }

    /// Local field at `(row, col)` excluding any feedback contribution.
    #[inline]
    fn local_field(&self, lattice: &Lattice, row: usize, col: usize) -> f64 {
        self.coupling * lattice.neighbor_sum(row, col) as f64 + self.base_field
    }

    /// Energy change of flipping `(row, col)`:
    /// `2 * s * (J * sum(neighbors) + h + feedback_field)`, with `s` the
    /// pre-flip spin. O(1); the lattice is not modified.
    #[inline]
    pub fn delta_energy(
        &self,
        lattice: &Lattice,
        row: usize,
        col: usize,
        feedback_field: f64,
    ) -> f64 {
        let s = lattice.get(row, col).as_f64();
        2.0 * s * (self.local_field(lattice, row, col) + feedback_field)
    }

    /// `-s * (J * sum(neighbors) + h)`. Summing this over all sites counts
    /// every bond twice.
    #[inline]
    pub fn site_energy(&self, lattice: &Lattice, row: usize, col: usize) -> f64 {
        -lattice.get(row, col).as_f64() * self.local_field(lattice, row, col)
    }

    /// Total energy with each bond counted once. O(1): reads the lattice's
    /// running bond and magnetization sums.
    pub fn total_energy(&self, lattice: &Lattice) -> f64 {
        -self.coupling * lattice.bond_sum() as f64
            - self.base_field * lattice.magnetization_sum(None) as f64
    }

    /// Per-site internal energy `U = <e_i>` and its second moment `<e_i^2>`
    /// over all sites.
    pub fn internal_energy(&self, lattice: &Lattice) -> (f64, f64) {
        let size = lattice.size();
        let mut e = 0.0;
        let mut e2 = 0.0;
        for row in 0..size {
            for col in 0..size {
                let ei = self.site_energy(lattice, row, col);
                e += ei;
                e2 += ei * ei;
            }
        }
        let n = lattice.n_spins() as f64;
        (e / n, e2 / n)
    }

    /// Site-energy variance `<e_i^2> - <e_i>^2`.
    pub fn heat_capacity(&self, lattice: &Lattice) -> f64 {
        let (u, u2) = self.internal_energy(lattice);
        u2 - u * u
    }
}
