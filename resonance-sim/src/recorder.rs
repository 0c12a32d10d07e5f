use std::sync::mpsc::SyncSender;

use thiserror::Error;

use crate::geometry::{Lattice, Spin};

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("frame buffer full ({capacity} frames)")]
    Full { capacity: usize },

    #[error("frame consumer disconnected")]
    Disconnected,
}

/// Owned copy of the lattice at the end of a given number of epochs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub epoch: u64,
    pub size: usize,
    /// Row-major spins, length `size * size`.
    pub spins: Vec<Spin>,
}

impl Snapshot {
    pub fn get(&self, row: usize, col: usize) -> Spin {
        self.spins[(row % self.size) * self.size + col % self.size]
    }

    pub fn mean_magnetization(&self) -> f64 {
        let sum: i64 = self.spins.iter().map(|&s| s.value() as i64).sum();
        sum as f64 / self.spins.len() as f64
    }
}

/// Consumer of lattice frames.
///
/// `emit_frame` is called synchronously from the simulation loop, in epoch
/// order; the loop does not continue until it returns.
pub trait Recorder {
    fn emit_frame(&mut self, lattice: &Lattice, epoch: u64) -> Result<(), RecorderError>;
}

/// Drops every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn emit_frame(&mut self, _lattice: &Lattice, _epoch: u64) -> Result<(), RecorderError> {
        Ok(())
    }
}

/// Keeps frames in memory, optionally refusing frames past a fixed capacity.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder {
    pub frames: Vec<Snapshot>,
    capacity: Option<usize>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }
}

impl Recorder for MemoryRecorder {
    fn emit_frame(&mut self, lattice: &Lattice, epoch: u64) -> Result<(), RecorderError> {
        if let Some(capacity) = self.capacity {
            if self.frames.len() >= capacity {
                return Err(RecorderError::Full { capacity });
            }
        }
        self.frames.push(lattice.snapshot(epoch));
        Ok(())
    }
}

/// Forwards frames over a bounded channel to another thread (e.g. an encoder).
///
/// `send` blocks while the channel is full, so the simulation waits on the
/// consumer rather than dropping or reordering frames.
pub struct ChannelRecorder {
    tx: SyncSender<Snapshot>,
}

impl ChannelRecorder {
    pub fn new(tx: SyncSender<Snapshot>) -> Self {
        Self { tx }
    }
}

impl Recorder for ChannelRecorder {
    fn emit_frame(&mut self, lattice: &Lattice, epoch: u64) -> Result<(), RecorderError> {
        self.tx
            .send(lattice.snapshot(epoch))
            .map_err(|_| RecorderError::Disconnected)
    }
}
