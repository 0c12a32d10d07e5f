use crate::feedback::FeedbackRegion;
use crate::geometry::Lattice;
use crate::rng::{RandomSource, SeededSource};

/// Complete mutable state of one run.
///
/// `epoch` counts completed epochs. The engine borrows the state for a single
/// step at a time; nothing else holds onto it.
#[derive(Clone, Debug)]
pub struct SimulationState<R = SeededSource> {
    pub epoch: u64,
    pub lattice: Lattice,
    pub feedback: FeedbackRegion,
    pub rng: R,
}

impl<R: RandomSource> SimulationState<R> {
    pub fn new(lattice: Lattice, feedback: FeedbackRegion, rng: R) -> Self {
        Self {
            epoch: 0,
            lattice,
            feedback,
            rng,
        }
    }
}
