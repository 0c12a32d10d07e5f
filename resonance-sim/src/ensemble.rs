use std::sync::atomic::AtomicBool;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::recorder::NullRecorder;
use crate::simulation::{RunOutcome, RunSummary, Simulation};
use crate::statistics::Observables;

/// Temperatures to scan and independent realizations per temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSpec {
    pub temperatures: Vec<f64>,
    pub n_realizations: usize,
}

/// Observables at one temperature, averaged over its realizations.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsemblePoint {
    pub temperature: f64,
    pub runs: usize,
    pub observables: Observables,
}

/// Run every `(temperature, realization)` pair as an independent simulation
/// and average per temperature.
///
/// Job `i` (temperature-major order) is seeded `config.seed + i` and never
/// records frames. Each simulation is sequential; rayon only distributes
/// whole simulations across threads. A single job runs on the calling
/// thread.
///
/// If `interrupted` stops any run early the whole scan fails with
/// [`SimError::Interrupted`] rather than averaging truncated runs.
pub fn run_ensemble(
    config: &SimConfig,
    spec: &EnsembleSpec,
    interrupted: &AtomicBool,
    on_epoch: &(dyn Fn(u64) + Sync),
) -> Result<Vec<EnsemblePoint>> {
    if spec.temperatures.is_empty() || spec.n_realizations == 0 {
        return Err(SimError::InvalidConfig(
            "ensemble needs at least one temperature and one realization".to_string(),
        ));
    }

    let jobs: Vec<SimConfig> = spec
        .temperatures
        .iter()
        .flat_map(|&temperature| (0..spec.n_realizations).map(move |_| temperature))
        .enumerate()
        .map(|(i, temperature)| SimConfig {
            temperature,
            seed: config.seed.wrapping_add(i as u64),
            record_video: false,
            ..config.clone()
        })
        .collect();

    // Fail on any invalid job before spending time on the others.
    let sims: Vec<Simulation> = jobs
        .into_iter()
        .map(Simulation::new)
        .collect::<Result<_>>()?;

    info!(
        n_temps = spec.temperatures.len(),
        n_realizations = spec.n_realizations,
        "starting ensemble"
    );

    let run_one = |mut sim: Simulation| -> Result<RunSummary> {
        sim.run(&mut NullRecorder, interrupted, on_epoch)
    };

    let summaries: Vec<RunSummary> = if sims.len() == 1 {
        sims.into_iter().map(run_one).collect::<Result<_>>()?
    } else {
        sims.into_par_iter().map(run_one).collect::<Result<_>>()?
    };

    let completed = summaries
        .iter()
        .filter(|s| s.outcome == RunOutcome::Completed)
        .count();
    if completed < summaries.len() {
        warn!(completed, total = summaries.len(), "ensemble interrupted");
        return Err(SimError::Interrupted {
            completed,
            total: summaries.len(),
        });
    }

    Ok(spec
        .temperatures
        .iter()
        .zip(summaries.chunks(spec.n_realizations))
        .map(|(&temperature, chunk)| {
            let obs: Vec<Observables> = chunk.iter().map(|s| s.observables.clone()).collect();
            EnsemblePoint {
                temperature,
                runs: chunk.len(),
                observables: Observables::aggregate(&obs),
            }
        })
        .collect())
}
