use super::offsets::square;
use super::region::Region;
use super::spin::Spin;
use crate::config::InitialState;
use crate::error::{Result, SimError};
use crate::recorder::Snapshot;
use crate::rng::RandomSource;

/// Periodic `size x size` square lattice of spins with a precomputed neighbor table.
///
/// Sites are indexed in row-major order: site `(row, col)` has flat index
/// `row * size + col`. The magnetization sum, the bond sum and the sum over
/// one tracked region are kept in step with every flip, so whole-lattice
/// energy and magnetization (and the tracked region's magnetization) are O(1).
#[derive(Clone, Debug)]
pub struct Lattice {
    size: usize,
    n_spins: usize,
    spins: Vec<Spin>,
    /// Layout: `neighbors[(i * 2 + d) * 2 + dir]` where `d` is the axis
    /// (0 = rows, 1 = columns) and `dir = 0` is forward, `dir = 1` backward.
    neighbors: Vec<u32>,
    /// Sum of all spin values.
    total: i64,
    /// Sum of `s_i * s_j` over nearest-neighbor bonds, each bond once.
    bonds: i64,
    /// Region whose spin sum is maintained incrementally, with that sum.
    tracked: Option<(Region, i64)>,
}

impl Lattice {
    /// Build a lattice in the requested initial state.
    ///
    /// `Random` consumes exactly `size * size` uniform draws in row-major
    /// order (`u < 0.5` gives a down spin); `Uniform` draws nothing.
    pub fn create(size: usize, init: InitialState, rng: &mut impl RandomSource) -> Result<Self> {
        if size < 2 {
            return Err(SimError::InvalidConfig(format!(
                "lattice size must be >= 2, got {size}"
            )));
        }

        let n_spins = size * size;
        let spins: Vec<Spin> = match init {
            InitialState::Uniform => vec![Spin::Up; n_spins],
            InitialState::Random => (0..n_spins)
                .map(|_| {
                    if rng.uniform() < 0.5 {
                        Spin::Down
                    } else {
                        Spin::Up
                    }
                })
                .collect(),
        };

        Ok(Self::from_spins(size, spins))
    }

    fn from_spins(size: usize, spins: Vec<Spin>) -> Self {
        let n_spins = size * size;
        debug_assert_eq!(spins.len(), n_spins);

        let offsets = square();
        let mut neighbors = vec![0u32; n_spins * offsets.len() * 2];
        for i in 0..n_spins {
            let coords = [i / size, i % size];
            for (d, off) in offsets.iter().enumerate() {
                for (dir, sign) in [(0, 1isize), (1, -1isize)] {
                    let r = (coords[0] as isize + sign * off[0]).rem_euclid(size as isize) as usize;
                    let c = (coords[1] as isize + sign * off[1]).rem_euclid(size as isize) as usize;
                    neighbors[(i * 2 + d) * 2 + dir] = (r * size + c) as u32;
                }
            }
        }

        let total = spins.iter().map(|&s| s.value() as i64).sum();

        let mut lattice = Self {
            size,
            n_spins,
            spins,
            neighbors,
            total,
            bonds: 0,
            tracked: None,
        };
        lattice.bonds = (0..n_spins)
            .map(|i| {
                let s = lattice.spins[i].value() as i64;
                let fwd = lattice.spins[lattice.neighbor(i, 0, true)].value() as i64
                    + lattice.spins[lattice.neighbor(i, 1, true)].value() as i64;
                s * fwd
            })
            .sum();
        lattice
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn n_spins(&self) -> usize {
        self.n_spins
    }

    /// Row-major view of every spin.
    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        (row % self.size) * self.size + col % self.size
    }

    #[inline]
    fn neighbor(&self, flat_idx: usize, axis: usize, forward: bool) -> usize {
        self.neighbors[(flat_idx * 2 + axis) * 2 + (!forward as usize)] as usize
    }

    /// Spin at `(row, col)`; both coordinates wrap modulo the lattice size.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Spin {
        self.spins[self.index(row, col)]
    }

    /// Negate the spin at `(row, col)` in place.
    #[inline]
    pub fn flip(&mut self, row: usize, col: usize) {
        let i = self.index(row, col);
        let old = self.spins[i].value() as i64;
        let h = self.neighbor_sum_at(i) as i64;
        self.spins[i] = self.spins[i].flipped();
        self.total -= 2 * old;
        self.bonds -= 2 * old * h;
        if let Some((region, sum)) = &mut self.tracked {
            if region.contains(i / self.size, i % self.size) {
                *sum -= 2 * old;
            }
        }
    }

    /// Maintain the spin sum of `region` across flips, making its
    /// magnetization O(1). Replaces any previously tracked region.
    pub fn track_region(&mut self, region: Region) {
        self.tracked = None;
        let sum = self.magnetization_sum(Some(&region));
        self.tracked = Some((region, sum));
    }

    /// The four nearest neighbors, ordered up, down, left, right.
    pub fn neighbors(&self, row: usize, col: usize) -> [Spin; 4] {
        let i = self.index(row, col);
        [
            self.spins[self.neighbor(i, 0, false)],
            self.spins[self.neighbor(i, 0, true)],
            self.spins[self.neighbor(i, 1, false)],
            self.spins[self.neighbor(i, 1, true)],
        ]
    }

    /// Sum of the four nearest-neighbor spin values.
    #[inline]
    pub fn neighbor_sum(&self, row: usize, col: usize) -> i32 {
        self.neighbor_sum_at(self.index(row, col))
    }

    #[inline]
    fn neighbor_sum_at(&self, i: usize) -> i32 {
        let mut h = 0i32;
        for axis in 0..2 {
            h += self.spins[self.neighbor(i, axis, true)].value() as i32;
            h += self.spins[self.neighbor(i, axis, false)].value() as i32;
        }
        h
    }

    /// Nearest-neighbor bond sum `sum_<ij> s_i s_j`, each bond counted once.
    pub fn bond_sum(&self) -> i64 {
        self.bonds
    }

    /// Sum of spin values over the whole lattice or over `region`.
    pub fn magnetization_sum(&self, region: Option<&Region>) -> i64 {
        match (region, &self.tracked) {
            (None, _) => self.total,
            (Some(r), Some((tracked, sum))) if r == tracked => *sum,
            (Some(r), _) => r
                .rows()
                .map(|row| {
                    let base = row * self.size;
                    self.spins[base + r.col_start..base + r.col_end]
                        .iter()
                        .map(|&s| s.value() as i64)
                        .sum::<i64>()
                })
                .sum(),
        }
    }

    /// Average spin over the whole lattice or over `region`, in `[-1, 1]`.
    ///
    /// An empty region has mean magnetization 0.
    pub fn mean_magnetization(&self, region: Option<&Region>) -> f64 {
        let count = region.map_or(self.n_spins, Region::area);
        if count == 0 {
            return 0.0;
        }
        self.magnetization_sum(region) as f64 / count as f64
    }

    /// Owned copy of the current configuration, tagged with `epoch`.
    pub fn snapshot(&self, epoch: u64) -> Snapshot {
        Snapshot {
            epoch,
            size: self.size,
            spins: self.spins.clone(),
        }
    }
}
