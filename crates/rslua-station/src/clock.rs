//! Simulation clock interface.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Run state of the host simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimulationState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl SimulationState {
    /// Numeric code exposed to scripts.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Stopped => 0,
            Self::Running => 1,
            Self::Paused => 2,
        }
    }
}

/// Global simulation time source owned by the host.
pub trait SimulationClock: Send + Sync {
    /// Current simulation time in milliseconds.
    fn current_time(&self) -> f64;

    fn state(&self) -> SimulationState;
}

/// A clock advanced explicitly by its owner.
#[derive(Debug, Default)]
pub struct ManualClock {
    inner: Mutex<(f64, SimulationState)>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_to(&self, time: f64) {
        self.inner.lock().0 = time;
    }

    pub fn set_state(&self, state: SimulationState) {
        self.inner.lock().1 = state;
    }
}

impl SimulationClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.inner.lock().0
    }

    fn state(&self) -> SimulationState {
        self.inner.lock().1
    }
}
