//! Last simulation time per device.

use parking_lot::Mutex;
use rslua_station::DeviceId;
use std::collections::HashMap;

/// Value reported for devices that never processed a simulation step.
pub const NEVER_SIMULATED: f64 = -1.0;

/// Per-device record of the last simulation step time.
#[derive(Debug, Default)]
pub struct SimulationTimes {
    times: Mutex<HashMap<DeviceId, f64>>,
}

impl SimulationTimes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: &DeviceId, time: f64) {
        self.times.lock().insert(id.clone(), time);
    }

    /// Last recorded time, or [`NEVER_SIMULATED`].
    #[must_use]
    pub fn last(&self, id: &DeviceId) -> f64 {
        self.times
            .lock()
            .get(id)
            .copied()
            .unwrap_or(NEVER_SIMULATED)
    }

    pub fn forget(&self, id: &DeviceId) {
        self.times.lock().remove(id);
    }
}
