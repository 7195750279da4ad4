//! Headless simulation loop driving the dispatcher.

use crate::station_file::{BuiltDevice, StationFile};
use rslua_script::{EventDispatcher, ScriptConfig, SessionState};
use rslua_station::{
    HostLog, LogMessage, ManualClock, MemoryLog, Project, Severity, SignalKind, SimulationClock,
    SimulationState, Station,
};
use serde::Serialize;
use std::sync::Arc;

/// A station with its dispatcher, clock and log.
pub struct Simulation {
    station: Arc<Station>,
    devices: Vec<BuiltDevice>,
    dispatcher: EventDispatcher,
    clock: Arc<ManualClock>,
    log: Arc<MemoryLog>,
    log_cursor: usize,
    steps: u64,
}

impl Simulation {
    /// Builds the station and loads every device script.
    pub fn new(file: &StationFile, config: ScriptConfig) -> anyhow::Result<Self> {
        let (station, devices) = file.build()?;
        let log = Arc::new(MemoryLog::new());
        let clock = Arc::new(ManualClock::new());
        let dispatcher = EventDispatcher::new(log.clone(), clock.clone(), config);

        let mut sim = Self {
            station,
            devices,
            dispatcher,
            clock,
            log,
            log_cursor: 0,
            steps: 0,
        };

        for built in &sim.devices {
            sim.dispatcher.attach(&built.device);
        }
        for built in &sim.devices {
            if let Some(script) = &built.script {
                built.device.set_script_path(script.to_string_lossy());
                sim.dispatcher.on_script_path_changed(&built.device);
            }
        }
        sim.pump_log();
        Ok(sim)
    }

    /// Runs `steps` steps of `step_ms` milliseconds each.
    pub fn run(&mut self, steps: u64, step_ms: f64) {
        self.clock.set_state(SimulationState::Running);
        for _ in 0..steps {
            self.step(step_ms);
        }
        self.clock.set_state(SimulationState::Stopped);
    }

    /// Advances the clock and delivers one step to every device.
    pub fn step(&mut self, step_ms: f64) {
        let previous = self.steps as f64 * step_ms;
        self.steps += 1;
        let time = self.steps as f64 * step_ms;
        self.clock.advance_to(time);

        for device in self.station.devices() {
            self.dispatcher.on_simulation_step(&device, time, previous);
            for change in self.station.take_pending_changes() {
                self.dispatcher
                    .on_io_signal_changed(&change.device, &change.signal);
            }
        }
        self.pump_log();
    }

    /// Feeds new host log messages back to the dispatcher.
    fn pump_log(&mut self) {
        loop {
            let fresh = self.log.messages_since(self.log_cursor);
            if fresh.is_empty() {
                break;
            }
            self.log_cursor += fresh.len();
            for message in fresh {
                self.dispatcher.on_log_message(&message.text);
            }
        }
    }

    /// Appends a message as if the host had logged it.
    pub fn host_message(&mut self, text: &str) {
        self.log.add_message(Severity::Information, text);
        self.pump_log();
    }

    #[must_use]
    pub fn report(&self) -> Report {
        let devices = self
            .station
            .devices()
            .iter()
            .map(|device| DeviceReport {
                name: device.name().to_string(),
                status: device.status(),
                script: device.script_path(),
                session: self
                    .dispatcher
                    .session_state(device.id())
                    .map(|s| format!("{s:?}")),
                signals: device
                    .signals()
                    .iter()
                    .map(|s| SignalReport {
                        name: s.name.clone(),
                        kind: s.kind,
                        value: s.value,
                    })
                    .collect(),
            })
            .collect();

        Report {
            station: self.station.name(),
            steps: self.steps,
            time_ms: self.clock.current_time(),
            live_interpreters: self.dispatcher.live_interpreters(),
            connections: self.station.connections().len(),
            devices,
            log: self.log.messages(),
        }
    }

    #[must_use]
    pub fn session_state(&self, name: &str) -> Option<SessionState> {
        let device = self.station.device_by_name(name)?;
        self.dispatcher.session_state(device.id())
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub station: String,
    pub steps: u64,
    pub time_ms: f64,
    pub live_interpreters: usize,
    pub connections: usize,
    pub devices: Vec<DeviceReport>,
    pub log: Vec<LogMessage>,
}

#[derive(Debug, Serialize)]
pub struct DeviceReport {
    pub name: String,
    pub status: String,
    pub script: String,
    pub session: Option<String>,
    pub signals: Vec<SignalReport>,
}

#[derive(Debug, Serialize)]
pub struct SignalReport {
    pub name: String,
    pub kind: SignalKind,
    pub value: f64,
}

impl Report {
    /// Renders the report for a terminal.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "Station {} after {} step(s), t = {} ms, {} live interpreter(s), {} connection(s)\n",
            self.station, self.steps, self.time_ms, self.live_interpreters, self.connections
        );
        for device in &self.devices {
            out.push_str(&format!(
                "\n{} [{}] status: {}\n",
                device.name,
                device.session.as_deref().unwrap_or("none"),
                device.status
            ));
            for signal in &device.signals {
                out.push_str(&format!(
                    "  {:<20} {:<20} {}\n",
                    signal.name,
                    signal.kind.as_str(),
                    signal.value
                ));
            }
        }
        if !self.log.is_empty() {
            out.push_str("\nLog:\n");
            for message in &self.log {
                out.push_str(&format!("  [{}] {}\n", message.severity, message.text));
            }
        }
        out
    }
}
