//! 2D Ising model under single-spin-flip Metropolis dynamics with a localized
//! feedback field, for stochastic resonance studies.
//!
//! A [`Simulation`] owns one [`SimulationState`] (lattice, feedback region,
//! random source) and advances it epoch by epoch, handing lattice frames to a
//! [`Recorder`]. [`run_ensemble`] scans temperatures over independent runs.

pub mod config;
pub mod energy;
pub mod ensemble;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod mcmc;
pub mod recorder;
pub mod rng;
pub mod simulation;
pub mod statistics;

pub use config::{FeedbackConfig, InitialState, SimConfig, StepsPerEpoch};
pub use energy::EnergyModel;
pub use ensemble::{run_ensemble, EnsemblePoint, EnsembleSpec};
pub use error::SimError;
pub use feedback::{Drive, FeedbackRegion};
pub use geometry::{Lattice, Region, Spin};
pub use mcmc::{MetropolisEngine, StepOutcome};
pub use recorder::{
    ChannelRecorder, MemoryRecorder, NullRecorder, Recorder, RecorderError, Snapshot,
};
pub use rng::{RandomSource, SeededSource};
pub use simulation::{Phase, RunOutcome, RunSummary, Simulation, SimulationState};
pub use statistics::{Observables, ResonanceResponse};
