use super::resonance::{ResonanceAccum, ResonanceResponse};
use super::stats::Statistics;
use crate::energy::EnergyModel;
use crate::feedback::FeedbackRegion;
use crate::geometry::Lattice;

/// Observables of one run: running averages over measured epochs plus the
/// thermodynamic state of the final lattice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observables {
    /// Number of epochs that contributed to the averages.
    pub measured_epochs: usize,
    /// <m>, mean magnetization per spin.
    pub mags: f64,
    /// <m^2>.
    pub mags2: f64,
    /// <|m|>.
    pub abs_mags: f64,
    /// <E>, energy per spin.
    pub energies: f64,
    /// <E^2>.
    pub energies2: f64,
    /// <m_R>, mean magnetization of the feedback region.
    pub region_mags: f64,
    /// Accepted flips / attempted flips.
    pub acceptance_rate: f64,
    /// |sum s| / N of the final lattice.
    pub net_magnetization: f64,
    /// Final per-site internal energy <e_i>.
    pub internal_energy: f64,
    /// Final site-energy variance <e_i^2> - <e_i>^2.
    pub heat_capacity: f64,
    pub resonance: ResonanceResponse,
}

impl Observables {
    /// Average [`Observables`] across independent runs.
    pub fn aggregate(results: &[Self]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let n = results.len() as f64;
        let mean = |f: &dyn Fn(&Self) -> f64| results.iter().map(f).sum::<f64>() / n;

        Self {
            measured_epochs: results.iter().map(|r| r.measured_epochs).sum(),
            mags: mean(&|r| r.mags),
            mags2: mean(&|r| r.mags2),
            abs_mags: mean(&|r| r.abs_mags),
            energies: mean(&|r| r.energies),
            energies2: mean(&|r| r.energies2),
            region_mags: mean(&|r| r.region_mags),
            acceptance_rate: mean(&|r| r.acceptance_rate),
            net_magnetization: mean(&|r| r.net_magnetization),
            internal_energy: mean(&|r| r.internal_energy),
            heat_capacity: mean(&|r| r.heat_capacity),
            resonance: ResonanceResponse {
                amplitude: mean(&|r| r.resonance.amplitude),
                phase_lag: mean(&|r| r.resonance.phase_lag),
                spectral_amplification: mean(&|r| r.resonance.spectral_amplification),
            },
        }
    }
}

/// Per-epoch accumulator feeding [`Observables`].
pub struct Measurements {
    mags: Statistics,
    mags2: Statistics,
    abs_mags: Statistics,
    energies: Statistics,
    energies2: Statistics,
    region_mags: Statistics,
    attempted: u64,
    accepted: u64,
    resonance: ResonanceAccum,
    drive_amplitude: f64,
}

impl Measurements {
    pub fn new(feedback: &FeedbackRegion) -> Self {
        let drive = feedback.drive();
        Self {
            mags: Statistics::new(1),
            mags2: Statistics::new(2),
            abs_mags: Statistics::new(1),
            energies: Statistics::new(1),
            energies2: Statistics::new(2),
            region_mags: Statistics::new(1),
            attempted: 0,
            accepted: 0,
            resonance: ResonanceAccum::new(drive.frequency, drive.phase),
            drive_amplitude: drive.amplitude,
        }
    }

    /// Record the lattice at the end of `epoch`, during which `accepted` of
    /// `attempted` flips went through.
    pub fn record(
        &mut self,
        epoch: u64,
        lattice: &Lattice,
        energy: &EnergyModel,
        feedback: &FeedbackRegion,
        accepted: usize,
        attempted: usize,
    ) {
        let m = lattice.mean_magnetization(None);
        let e = energy.total_energy(lattice) / lattice.n_spins() as f64;
        let m_region = lattice.mean_magnetization(Some(feedback.region()));

        self.mags.update(m);
        self.mags2.update(m);
        self.abs_mags.update(m.abs());
        self.energies.update(e);
        self.energies2.update(e);
        self.region_mags.update(m_region);
        self.accepted += accepted as u64;
        self.attempted += attempted as u64;
        self.resonance.push(epoch, m_region);
    }

    pub fn finish(&self, lattice: &Lattice, energy: &EnergyModel) -> Observables {
        let (internal_energy, u2) = energy.internal_energy(lattice);
        Observables {
            measured_epochs: self.mags.count,
            mags: self.mags.average(),
            mags2: self.mags2.average(),
            abs_mags: self.abs_mags.average(),
            energies: self.energies.average(),
            energies2: self.energies2.average(),
            region_mags: self.region_mags.average(),
            acceptance_rate: if self.attempted == 0 {
                0.0
            } else {
                self.accepted as f64 / self.attempted as f64
            },
            net_magnetization: lattice.mean_magnetization(None).abs(),
            internal_energy,
            heat_capacity: u2 - internal_energy * internal_energy,
            resonance: self.resonance.finish(self.drive_amplitude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitialState;
    use crate::feedback::Drive;
    use crate::geometry::Region;
    use crate::rng::SeededSource;

    #[test]
    fn test_record_aligned_lattice() {
        let mut lat =
            Lattice::create(4, InitialState::Uniform, &mut SeededSource::new(0)).unwrap();
        let energy = EnergyModel::default();
        let fb = FeedbackRegion::new(Region::new(0..2, 0..2), 0.0, Drive::new(0.0, 0.1));
        let mut meas = Measurements::new(&fb);

        meas.record(0, &lat, &energy, &fb, 3, 16);
        lat.flip(0, 0);
        meas.record(1, &lat, &energy, &fb, 1, 16);

        let obs = meas.finish(&lat, &energy);
        assert_eq!(obs.measured_epochs, 2);
        assert_eq!(obs.mags, (1.0 + 14.0 / 16.0) / 2.0);
        assert_eq!(obs.region_mags, (1.0 + 0.5) / 2.0);
        assert_eq!(obs.acceptance_rate, 4.0 / 32.0);
        assert_eq!(obs.net_magnetization, 14.0 / 16.0);
        // aligned: -2 per spin; one flipped site adds 8 to the total
        assert_eq!(obs.energies, (-2.0 + (-32.0 + 8.0) / 16.0) / 2.0);
        assert!(obs.heat_capacity > 0.0);
    }

    #[test]
    fn test_aggregate_averages() {
        let a = Observables {
            measured_epochs: 10,
            mags: 1.0,
            heat_capacity: 2.0,
            ..Observables::default()
        };
        let b = Observables {
            measured_epochs: 10,
            mags: 0.0,
            heat_capacity: 4.0,
            ..Observables::default()
        };
        let agg = Observables::aggregate(&[a, b]);
        assert_eq!(agg.measured_epochs, 20);
        assert_eq!(agg.mags, 0.5);
        assert_eq!(agg.heat_capacity, 3.0);
        assert_eq!(Observables::aggregate(&[]), Observables::default());
    }
}
