use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::geometry::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialState {
    #[serde(alias = "u")]
    Uniform,
    #[default]
    #[serde(alias = "r")]
    Random,
}

impl TryFrom<&str> for InitialState {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "u" | "uniform" => Ok(Self::Uniform),
            "r" | "random" => Ok(Self::Random),
            _ => Err(format!(
                "unknown initial_state '{s}', expected 'uniform' ('u') or 'random' ('r')"
            )),
        }
    }
}

/// How many single-spin-flip attempts make up one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepsPerEpoch {
    /// One sweep: `size * size` attempts.
    #[default]
    Sweep,
    /// A fixed number of attempts regardless of lattice size.
    Fixed(usize),
}

impl StepsPerEpoch {
    pub fn steps(&self, size: usize) -> usize {
        match self {
            Self::Sweep => size * size,
            Self::Fixed(n) => *n,
        }
    }
}

fn validate_feedback_config(cfg: &FeedbackConfig) -> Result<(), ValidationError> {
    if !(cfg.gain.is_finite()
        && cfg.amplitude.is_finite()
        && cfg.frequency.is_finite()
        && cfg.phase.is_finite())
    {
        return Err(ValidationError::new(
            "feedback gain, amplitude, frequency and phase must be finite",
        ));
    }
    Ok(())
}

/// Localized feedback: region bounds, gain and periodic drive.
///
/// Unset bounds resolve against the lattice size to the central square
/// `[size/4, 3*size/4)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_feedback_config"))]
#[serde(default)]
pub struct FeedbackConfig {
    pub row_start: Option<usize>,
    pub row_end: Option<usize>,
    pub col_start: Option<usize>,
    pub col_end: Option<usize>,
    /// Weight of the region's own mean magnetization in its field.
    pub gain: f64,
    /// Peak drive field.
    pub amplitude: f64,
    /// Drive frequency in cycles per epoch.
    pub frequency: f64,
    /// Drive phase offset in radians.
    pub phase: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            row_start: None,
            row_end: None,
            col_start: None,
            col_end: None,
            gain: 0.0,
            amplitude: 0.0,
            frequency: 0.01,
            phase: 0.0,
        }
    }
}

impl FeedbackConfig {
    pub fn region(&self, size: usize) -> Region {
        let centered = Region::centered(size);
        Region {
            row_start: self.row_start.unwrap_or(centered.row_start),
            row_end: self.row_end.unwrap_or(centered.row_end),
            col_start: self.col_start.unwrap_or(centered.col_start),
            col_end: self.col_end.unwrap_or(centered.col_end),
        }
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.size < 2 {
        return Err(ValidationError::new("size must be >= 2"));
    }
    if !(cfg.temperature.is_finite() && cfg.temperature > 0.0) {
        return Err(ValidationError::new("temperature must be finite and > 0"));
    }
    if !(cfg.coupling.is_finite() && cfg.base_field.is_finite()) {
        return Err(ValidationError::new(
            "coupling and base_field must be finite",
        ));
    }
    if cfg.snapshot_interval == Some(0) {
        return Err(ValidationError::new("snapshot_interval must be >= 1"));
    }
    if cfg.steps_per_epoch == StepsPerEpoch::Fixed(0) {
        return Err(ValidationError::new("steps_per_epoch must be >= 1"));
    }
    if cfg.warmup_epochs > cfg.epochs {
        return Err(ValidationError::new("warmup_epochs must be <= epochs"));
    }
    if !cfg.feedback.region(cfg.size).fits(cfg.size) {
        return Err(ValidationError::new(
            "feedback region must be ordered and lie within the lattice",
        ));
    }
    Ok(())
}

/// Full run configuration. Every field has a default, so a partial
/// document deserializes into a runnable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_sim_config"))]
#[serde(default)]
pub struct SimConfig {
    pub temperature: f64,
    pub initial_state: InitialState,
    pub size: usize,
    pub epochs: u64,
    pub record_video: bool,
    /// Frames are emitted when the completed-epoch count is a multiple of
    /// this. `None` spreads roughly 75 frames over the run.
    pub snapshot_interval: Option<u64>,
    pub steps_per_epoch: StepsPerEpoch,
    /// Nearest-neighbor coupling J.
    pub coupling: f64,
    /// Uniform external field h seen by every site.
    pub base_field: f64,
    pub seed: u64,
    /// Epochs run before observables start accumulating.
    pub warmup_epochs: u64,
    #[validate]
    pub feedback: FeedbackConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            initial_state: InitialState::Random,
            size: 100,
            epochs: 1_000_000,
            record_video: false,
            snapshot_interval: None,
            steps_per_epoch: StepsPerEpoch::Sweep,
            coupling: 1.0,
            base_field: 0.0,
            seed: 42,
            warmup_epochs: 0,
            feedback: FeedbackConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn snapshot_interval(&self) -> u64 {
        self.snapshot_interval
            .unwrap_or_else(|| (self.epochs / 75).max(1))
    }

    pub fn steps_per_epoch(&self) -> usize {
        self.steps_per_epoch.steps(self.size)
    }

    pub fn feedback_region(&self) -> Region {
        self.feedback.region(self.size)
    }
}
