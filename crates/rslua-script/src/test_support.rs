//! Station fixture shared by unit tests.

use crate::bridge::BridgeEnv;
use crate::clock::SimulationTimes;
use crate::host::HostServices;
use crate::registry::ComponentRegistry;
use rslua_station::{Device, ManualClock, MemoryLog, Station};
use std::sync::Arc;

pub(crate) struct Fixture {
    pub station: Arc<Station>,
    pub device: Arc<Device>,
    pub log: Arc<MemoryLog>,
    pub clock: Arc<ManualClock>,
    pub env: BridgeEnv,
}

/// A named station with one registered device called `Gripper`.
pub(crate) fn fixture() -> Fixture {
    let log = Arc::new(MemoryLog::new());
    let clock = Arc::new(ManualClock::new());
    let host = HostServices::new(log.clone(), clock.clone(), "LuaScript");
    let registry = Arc::new(ComponentRegistry::new(host.clone()));

    let station = Station::new("Cell");
    let device = station.add_device("Gripper");
    registry.register(Arc::clone(&device));

    Fixture {
        station,
        device,
        log,
        clock,
        env: BridgeEnv {
            registry,
            times: Arc::new(SimulationTimes::new()),
            host,
        },
    }
}
