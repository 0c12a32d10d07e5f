pub mod metropolis;

pub use metropolis::{acceptance_probability, MetropolisEngine, StepOutcome};
