pub mod state;

pub use state::SimulationState;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::SimConfig;
use crate::energy::EnergyModel;
use crate::error::{Result, SimError};
use crate::feedback::FeedbackRegion;
use crate::geometry::Lattice;
use crate::mcmc::MetropolisEngine;
use crate::recorder::Recorder;
use crate::rng::{RandomSource, SeededSource};
use crate::statistics::{Measurements, Observables};

/// Lifecycle of a [`Simulation`]. Construction covers `Initializing`; a
/// successfully constructed simulation starts in `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All configured epochs ran.
    Completed,
    /// The stop flag was raised; the lattice is the one left by the last
    /// whole epoch.
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub epochs_completed: u64,
    pub frames_emitted: u64,
    pub observables: Observables,
}

/// Epoch-driven Metropolis simulation of one lattice with a feedback region.
///
/// Each epoch:
/// 1. Check the stop flag (only between epochs, never mid-sweep)
/// 2. Latch the feedback field from the region's magnetization and the drive
/// 3. Run `steps_per_epoch` single-spin-flip attempts
/// 4. Measure (after `warmup_epochs`)
/// 5. Emit a frame when the completed-epoch count is a multiple of
///    `snapshot_interval` (only with `record_video`)
///
/// The initial lattice is emitted as frame 0 before the first epoch.
pub struct Simulation<R = SeededSource> {
    config: SimConfig,
    engine: MetropolisEngine,
    state: SimulationState<R>,
    phase: Phase,
}

impl Simulation<SeededSource> {
    /// Validate `config` and build the initial state from `config.seed`.
    pub fn new(config: SimConfig) -> Result<Self> {
        let rng = SeededSource::new(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Validate `config` and build the initial state using `rng`.
    pub fn with_rng(config: SimConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        debug!(phase = ?Phase::Initializing, size = config.size, "building lattice");

        let mut lattice = Lattice::create(config.size, config.initial_state, &mut rng)?;
        let feedback = FeedbackRegion::from_config(&config.feedback, config.size);
        lattice.track_region(*feedback.region());
        let engine = MetropolisEngine::new(
            config.temperature,
            EnergyModel::new(config.coupling, config.base_field),
        );

        debug!(phase = ?Phase::Running, region = ?feedback.region(), "simulation ready");
        Ok(Self {
            config,
            engine,
            state: SimulationState::new(lattice, feedback, rng),
            phase: Phase::Running,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState<R> {
        &self.state
    }

    pub fn lattice(&self) -> &Lattice {
        &self.state.lattice
    }

    pub fn engine(&self) -> &MetropolisEngine {
        &self.engine
    }

    fn emit(&self, recorder: &mut impl Recorder) -> Result<()> {
        let epoch = self.state.epoch;
        recorder
            .emit_frame(&self.state.lattice, epoch)
            .map_err(|source| SimError::ResourceExhaustion { epoch, source })?;
        debug!(epoch, "frame emitted");
        Ok(())
    }

    fn run_epochs(
        &mut self,
        recorder: &mut impl Recorder,
        interrupted: &AtomicBool,
        on_epoch: &(dyn Fn(u64) + Sync),
        measurements: &mut Measurements,
        frames_emitted: &mut u64,
    ) -> Result<RunOutcome> {
        let epochs = self.config.epochs;
        let interval = self.config.snapshot_interval();
        let steps = self.config.steps_per_epoch();
        let record_video = self.config.record_video;
        let warmup = self.config.warmup_epochs;

        if record_video {
            self.emit(recorder)?;
            *frames_emitted += 1;
        }

        while self.state.epoch < epochs {
            if interrupted.load(Ordering::Relaxed) {
                warn!(epoch = self.state.epoch, "stop requested");
                return Ok(RunOutcome::Stopped);
            }

            let epoch = self.state.epoch;
            self.state.feedback.latch(&self.state.lattice, epoch);
            let accepted = self.engine.sweep(&mut self.state, steps);
            self.state.epoch += 1;

            if epoch >= warmup {
                measurements.record(
                    epoch,
                    &self.state.lattice,
                    &self.engine.energy,
                    &self.state.feedback,
                    accepted,
                    steps,
                );
            }

            if record_video && self.state.epoch % interval == 0 {
                self.emit(recorder)?;
                *frames_emitted += 1;
            }

            on_epoch(self.state.epoch);
        }
        Ok(RunOutcome::Completed)
    }

    /// Drive the simulation to completion, or until `interrupted` is raised.
    ///
    /// Frames go to `recorder` only when `record_video` is set. A recorder
    /// failure ends the run with [`SimError::ResourceExhaustion`]; the
    /// lattice is left as it was after the epoch whose frame was refused.
    /// `on_epoch` receives the completed-epoch count after every epoch.
    ///
    /// Once the simulation has completed, further calls do nothing and
    /// report zero epochs.
    pub fn run(
        &mut self,
        recorder: &mut impl Recorder,
        interrupted: &AtomicBool,
        on_epoch: &(dyn Fn(u64) + Sync),
    ) -> Result<RunSummary> {
        let mut measurements = Measurements::new(&self.state.feedback);

        if self.phase == Phase::Completed {
            warn!("run() called on a completed simulation; nothing to do");
            return Ok(RunSummary {
                outcome: RunOutcome::Completed,
                epochs_completed: 0,
                frames_emitted: 0,
                observables: measurements.finish(&self.state.lattice, &self.engine.energy),
            });
        }

        let start_epoch = self.state.epoch;
        info!(
            size = self.config.size,
            temperature = self.config.temperature,
            epochs = self.config.epochs,
            steps_per_epoch = self.config.steps_per_epoch(),
            snapshot_interval = self.config.snapshot_interval(),
            record_video = self.config.record_video,
            "starting simulation"
        );

        let mut frames_emitted = 0u64;
        let result = self.run_epochs(
            recorder,
            interrupted,
            on_epoch,
            &mut measurements,
            &mut frames_emitted,
        );
        self.phase = Phase::Completed;
        let outcome = result?;

        let observables = measurements.finish(&self.state.lattice, &self.engine.energy);
        info!(
            epochs_completed = self.state.epoch - start_epoch,
            frames_emitted,
            net_magnetization = observables.net_magnetization,
            heat_capacity = observables.heat_capacity,
            "simulation finished"
        );

        Ok(RunSummary {
            outcome,
            epochs_completed: self.state.epoch - start_epoch,
            frames_emitted,
            observables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeedbackConfig, InitialState, StepsPerEpoch};
    use crate::geometry::Spin;
    use crate::recorder::{MemoryRecorder, NullRecorder, RecorderError};
    use std::sync::atomic::AtomicU64;

    fn small(epochs: u64) -> SimConfig {
        SimConfig {
            size: 8,
            epochs,
            temperature: 2.0,
            record_video: true,
            snapshot_interval: Some(1),
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_zero_epochs_emits_initial_frame() {
        let config = SimConfig {
            size: 4,
            epochs: 0,
            initial_state: InitialState::Uniform,
            temperature: 0.5,
            record_video: true,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        assert_eq!(sim.phase(), Phase::Running);

        let mut rec = MemoryRecorder::new();
        let summary = sim.run(&mut rec, &AtomicBool::new(false), &|_| {}).unwrap();

        assert_eq!(sim.phase(), Phase::Completed);
        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.epochs_completed, 0);
        assert_eq!(rec.frames.len(), 1);
        assert_eq!(rec.frames[0].epoch, 0);
        assert!(rec.frames[0].spins.iter().all(|&s| s == Spin::Up));
        assert_eq!(rec.frames[0].mean_magnetization(), 1.0);
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let err = Simulation::new(SimConfig { size: 1, ..small(1) }).err().unwrap();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        let err = Simulation::new(SimConfig { temperature: 0.0, ..small(1) }).err().unwrap();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        let err = Simulation::new(SimConfig { snapshot_interval: Some(0), ..small(1) })
            .err()
            .unwrap();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn test_frame_cadence() {
        let config = SimConfig { snapshot_interval: Some(3), ..small(10) };
        let mut sim = Simulation::new(config).unwrap();
        let mut rec = MemoryRecorder::new();
        let summary = sim.run(&mut rec, &AtomicBool::new(false), &|_| {}).unwrap();
        let epochs: Vec<u64> = rec.frames.iter().map(|f| f.epoch).collect();
        assert_eq!(epochs, vec![0, 3, 6, 9]);
        assert_eq!(summary.frames_emitted, 4);
        assert_eq!(summary.epochs_completed, 10);
        assert_eq!(summary.observables.measured_epochs, 10);
    }

    #[test]
    fn test_record_video_off_discards_frames() {
        let config = SimConfig { record_video: false, ..small(5) };
        let mut sim = Simulation::new(config).unwrap();
        let mut rec = MemoryRecorder::with_capacity(0);
        let summary = sim.run(&mut rec, &AtomicBool::new(false), &|_| {}).unwrap();
        assert_eq!(summary.frames_emitted, 0);
        assert!(rec.frames.is_empty());
    }

    #[test]
    fn test_recorder_failure_is_resource_exhaustion() {
        let mut sim = Simulation::new(small(10)).unwrap();
        let mut rec = MemoryRecorder::with_capacity(3);
        let err = sim.run(&mut rec, &AtomicBool::new(false), &|_| {}).unwrap_err();
        match err {
            SimError::ResourceExhaustion { epoch, source } => {
                assert_eq!(epoch, 3);
                assert!(matches!(source, RecorderError::Full { capacity: 3 }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        // no rollback: the lattice stays at the refused frame's epoch
        assert_eq!(sim.state().epoch, 3);
        assert_eq!(sim.phase(), Phase::Completed);
    }

    #[test]
    fn test_stop_flag_checked_between_epochs() {
        let mut sim = Simulation::new(small(100)).unwrap();
        let stop = AtomicBool::new(false);
        let seen = AtomicU64::new(0);
        let mut rec = MemoryRecorder::new();
        let summary = sim
            .run(&mut rec, &stop, &|epoch| {
                seen.store(epoch, Ordering::Relaxed);
                if epoch == 7 {
                    stop.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Stopped);
        assert_eq!(summary.epochs_completed, 7);
        assert_eq!(seen.load(Ordering::Relaxed), 7);
        assert_eq!(sim.state().epoch, 7);
        let last = rec.frames.last().unwrap();
        assert_eq!(last.epoch, 7);
        assert_eq!(last.spins, sim.lattice().spins());
    }

    #[test]
    fn test_completed_simulation_does_not_restart() {
        let mut sim = Simulation::new(small(4)).unwrap();
        let stop = AtomicBool::new(false);
        sim.run(&mut NullRecorder, &stop, &|_| {}).unwrap();
        let after = sim.lattice().clone();

        let mut rec = MemoryRecorder::new();
        let again = sim.run(&mut rec, &stop, &|_| {}).unwrap();
        assert_eq!(again.epochs_completed, 0);
        assert!(rec.frames.is_empty());
        assert_eq!(sim.lattice().spins(), after.spins());
    }

    #[test]
    fn test_fixed_steps_per_epoch() {
        let config = SimConfig {
            steps_per_epoch: StepsPerEpoch::Fixed(1),
            initial_state: InitialState::Uniform,
            temperature: 0.1,
            ..small(20)
        };
        let mut sim = Simulation::new(config).unwrap();
        let mut rec = MemoryRecorder::new();
        sim.run(&mut rec, &AtomicBool::new(false), &|_| {}).unwrap();
        // one attempt per epoch: consecutive frames differ in at most one site
        for pair in rec.frames.windows(2) {
            let diff = pair[0]
                .spins
                .iter()
                .zip(pair[1].spins.iter())
                .filter(|(a, b)| a != b)
                .count();
            assert!(diff <= 1);
        }
    }

    #[test]
    fn test_warmup_epochs_excluded() {
        let config = SimConfig { warmup_epochs: 6, ..small(10) };
        let mut sim = Simulation::new(config).unwrap();
        let summary = sim.run(&mut NullRecorder, &AtomicBool::new(false), &|_| {}).unwrap();
        assert_eq!(summary.observables.measured_epochs, 4);
    }

    #[test]
    fn test_running_sums_survive_a_run() {
        let config = SimConfig {
            feedback: FeedbackConfig {
                gain: 0.4,
                amplitude: 0.2,
                ..FeedbackConfig::default()
            },
            ..small(30)
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run(&mut NullRecorder, &AtomicBool::new(false), &|_| {}).unwrap();

        let lat = sim.lattice();
        let region = *sim.state().feedback.region();
        let recount: i64 = region
            .rows()
            .flat_map(|row| region.cols().map(move |col| (row, col)))
            .map(|(row, col)| lat.get(row, col).value() as i64)
            .sum();
        assert_eq!(lat.magnetization_sum(Some(&region)), recount);

        let fresh = Lattice::create(8, InitialState::Uniform, &mut SeededSource::new(0)).unwrap();
        assert_eq!(fresh.bond_sum(), 128);
        let energy = sim.engine().energy;
        let bonds: f64 = (0..8)
            .flat_map(|row| (0..8).map(move |col| (row, col)))
            .map(|(row, col)| {
                let s = lat.get(row, col).as_f64();
                s * (lat.get(row + 1, col).as_f64() + lat.get(row, col + 1).as_f64())
            })
            .sum();
        assert_eq!(energy.total_energy(lat), -energy.coupling * bonds);
    }

    #[test]
    fn test_feedback_latched_each_epoch() {
        let config = SimConfig {
            feedback: FeedbackConfig {
                amplitude: 0.5,
                frequency: 0.25,
                gain: 0.0,
                ..FeedbackConfig::default()
            },
            ..small(2)
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run(&mut NullRecorder, &AtomicBool::new(false), &|_| {}).unwrap();
        // last latched epoch is 1: 0.5 * sin(pi/2)
        assert!((sim.state().feedback.latched() - 0.5).abs() < 1e-12);
    }
}
