use std::f64::consts::TAU;

use crate::config::FeedbackConfig;
use crate::geometry::{Lattice, Region};

/// Periodic drive `amplitude * sin(2*pi*frequency*epoch + phase)`.
///
/// A pure function of the epoch; it never touches the random source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drive {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl Drive {
    pub fn new(amplitude: f64, frequency: f64) -> Self {
        Self {
            amplitude,
            frequency,
            phase: 0.0,
        }
    }

    #[inline]
    pub fn value(&self, epoch: u64) -> f64 {
        self.amplitude * (TAU * self.frequency * epoch as f64 + self.phase).sin()
    }
}

/// Sub-rectangle whose sites feel an extra field built from the region's own
/// mean magnetization and the periodic drive.
///
/// The field is latched once per epoch with [`FeedbackRegion::latch`] and then
/// held constant for every step of that epoch.
#[derive(Clone, Debug)]
pub struct FeedbackRegion {
    region: Region,
    gain: f64,
    drive: Drive,
    latched: f64,
}

impl FeedbackRegion {
    pub fn new(region: Region, gain: f64, drive: Drive) -> Self {
        Self {
            region,
            gain,
            drive,
            latched: 0.0,
        }
    }

    pub fn from_config(cfg: &FeedbackConfig, size: usize) -> Self {
        Self::new(
            cfg.region(size),
            cfg.gain,
            Drive {
                amplitude: cfg.amplitude,
                frequency: cfg.frequency,
                phase: cfg.phase,
            },
        )
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn drive(&self) -> &Drive {
        &self.drive
    }

    /// `gain * <s>_region + drive(epoch)`, or 0 for an empty region.
    pub fn effective_field(&self, lattice: &Lattice, epoch: u64) -> f64 {
        if self.region.is_empty() {
            return 0.0;
        }
        self.gain * lattice.mean_magnetization(Some(&self.region)) + self.drive.value(epoch)
    }

    /// Recompute the field for `epoch` from the current lattice and hold it.
    pub fn latch(&mut self, lattice: &Lattice, epoch: u64) -> f64 {
        self.latched = self.effective_field(lattice, epoch);
        self.latched
    }

    pub fn latched(&self) -> f64 {
        self.latched
    }

    /// Extra field seen by `(row, col)`: the latched value inside the region,
    /// 0 outside.
    #[inline]
    pub fn field_at(&self, row: usize, col: usize) -> f64 {
        if self.region.contains(row, col) {
            self.latched
        } else {
            0.0
        }
    }
}
