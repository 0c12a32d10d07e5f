pub mod observables;
pub mod resonance;
mod stats;

pub use observables::{Measurements, Observables};
pub use resonance::{ResonanceAccum, ResonanceResponse};
pub use stats::Statistics;
