use crate::energy::EnergyModel;
use crate::rng::RandomSource;
use crate::simulation::SimulationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted,
    Rejected,
}

/// Metropolis acceptance probability `min(1, exp(-delta_e / T))`.
///
/// `T = 0` is the deterministic limit: downhill and neutral moves are always
/// taken, uphill moves never.
#[inline]
pub fn acceptance_probability(delta_e: f64, temperature: f64) -> f64 {
    if delta_e <= 0.0 {
        1.0
    } else if temperature <= 0.0 {
        0.0
    } else {
        (-delta_e / temperature).exp()
    }
}

/// Decide a proposed flip. Moves with `delta_e <= 0` are accepted without
/// drawing; otherwise exactly one uniform sample `u` is drawn and the move is
/// accepted iff `u < exp(-delta_e / T)` (strict).
#[inline]
pub fn accept(delta_e: f64, temperature: f64, rng: &mut impl RandomSource) -> bool {
    if delta_e <= 0.0 {
        return true;
    }
    rng.uniform() < acceptance_probability(delta_e, temperature)
}

/// Single-spin-flip Metropolis at fixed temperature.
///
/// Holds no simulation state of its own; each call borrows the state for
/// one attempted flip.
#[derive(Debug, Clone, Copy)]
pub struct MetropolisEngine {
    pub temperature: f64,
    pub energy: EnergyModel,
}

impl MetropolisEngine {
    pub fn new(temperature: f64, energy: EnergyModel) -> Self {
        Self {
            temperature,
            energy,
        }
    }

    /// Attempt one flip at a uniformly drawn site.
    #[cfg_attr(feature = "profile", inline(never))]
    pub fn step<R: RandomSource>(&self, state: &mut SimulationState<R>) -> StepOutcome {
        let size = state.lattice.size();
        let (row, col) = state.rng.site(size);
        let feedback_field = state.feedback.field_at(row, col);
        let delta_e = self
            .energy
            .delta_energy(&state.lattice, row, col, feedback_field);

        if accept(delta_e, self.temperature, &mut state.rng) {
            state.lattice.flip(row, col);
            StepOutcome::Accepted
        } else {
            StepOutcome::Rejected
        }
    }

    /// Attempt `n_steps` flips and return how many were accepted.
    #[cfg_attr(feature = "profile", inline(never))]
    pub fn sweep<R: RandomSource>(&self, state: &mut SimulationState<R>, n_steps: usize) -> usize {
        (0..n_steps)
            .filter(|_| self.step(state) == StepOutcome::Accepted)
            .count()
    }
}
