//! Shared harness for rslua-script integration tests.

#![allow(dead_code)]

use rslua_script::{EventDispatcher, ScriptConfig};
use rslua_station::{Device, ManualClock, MemoryLog, SimulationClock, Station};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub struct Harness {
    pub dispatcher: EventDispatcher,
    pub log: Arc<MemoryLog>,
    pub clock: Arc<ManualClock>,
    pub station: Arc<Station>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ScriptConfig::default())
    }

    pub fn with_config(config: ScriptConfig) -> Self {
        let log = Arc::new(MemoryLog::new());
        let clock = Arc::new(ManualClock::new());
        Self {
            dispatcher: EventDispatcher::new(log.clone(), clock.clone(), config),
            log,
            clock,
            station: Station::new("Cell"),
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Writes `source` next to the other test scripts and returns its path.
    pub fn script(&self, name: &str, source: &str) -> String {
        write_script(self.dir.path(), name, source)
    }

    /// Adds a device, points it at `source` and loads it.
    pub fn device_with_script(&mut self, name: &str, source: &str) -> Arc<Device> {
        let device = self.station.add_device(name);
        device.set_script_path(self.script(&format!("{name}.lua"), source));
        self.dispatcher.attach(&device);
        self.dispatcher.on_script_path_changed(&device);
        device
    }

    /// Advances the clock and steps every device once.
    pub fn step(&mut self, time: f64) {
        let previous = self.clock.current_time();
        self.clock.advance_to(time);
        for device in self.station.devices() {
            self.dispatcher.on_simulation_step(&device, time, previous);
        }
        for change in self.station.take_pending_changes() {
            self.dispatcher
                .on_io_signal_changed(&change.device, &change.signal);
        }
    }
}

pub fn write_script(dir: &Path, name: &str, source: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, source).expect("write script");
    path.to_string_lossy().into_owned()
}
