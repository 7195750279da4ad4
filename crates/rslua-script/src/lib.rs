//! Per-device Lua scripting for simulated stations.
//!
//! Each device can point at a Lua script. The script runs once when loaded,
//! may define entry points, and talks back to the host through a fixed set
//! of bridge functions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 EventDispatcher                      │
//! │  host events ──▶ register device ──▶ ensure session  │
//! │                                        │             │
//! │  ┌─────────────────────────────────────▼──────────┐  │
//! │  │  InterpreterSession (one per DeviceId)         │  │
//! │  │  lua: Lua (mlua)                               │  │
//! │  │  globals: SmartComponent, set_status, ...      │  │
//! │  └─────────────────────────────────────┬──────────┘  │
//! │                                        │ bridge call │
//! │  ┌─────────────────────────────────────▼──────────┐  │
//! │  │  ComponentRegistry (sweep, then resolve id)    │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Lua Script
//!
//! ```lua
//! clear_signals()
//! add_signal("Start", "DigitalInput")
//! add_signal("Done", "DigitalOutput")
//!
//! function on_io_signal_value_changed(name, value)
//!     if name == "Start" then
//!         set_signal("Done", iif(value == 1, 1, 0))
//!     end
//! end
//!
//! function on_simulation_step()
//!     local t = get_last_simulation_time()
//!     set_status(string.format("t=%.0f", t))
//! end
//! ```
//!
//! # Usage
//!
//! ```
//! use rslua_script::{EventDispatcher, ScriptConfig};
//! use rslua_station::{ManualClock, MemoryLog, Station};
//! use std::sync::Arc;
//!
//! let log = Arc::new(MemoryLog::new());
//! let mut dispatcher =
//!     EventDispatcher::new(log.clone(), Arc::new(ManualClock::new()), ScriptConfig::default());
//!
//! let station = Station::new("Cell");
//! let gripper = station.add_device("Gripper");
//! dispatcher.attach(&gripper);
//! dispatcher.on_simulation_step(&gripper, 24.0, 0.0);
//!
//! assert_eq!(dispatcher.times().last(gripper.id()), 24.0);
//! ```

mod bridge;
mod chooser;
mod clock;
pub mod config;
mod dispatcher;
mod error;
mod host;
mod registry;
mod session;

#[cfg(test)]
mod test_support;

pub use bridge::{BridgeEnv, BRIDGE_FUNCTIONS, COMPONENT_GLOBAL};
pub use chooser::{NoChooser, ScriptChooser};
pub use clock::{SimulationTimes, NEVER_SIMULATED};
pub use config::{ConfigError, ConfigLoader, ScriptConfig};
pub use dispatcher::{
    EventDispatcher, ON_IO_SIGNAL_VALUE_CHANGED, ON_SIMULATION_STEP, STATUS_LOADED,
};
pub use error::ScriptError;
pub use host::HostServices;
pub use registry::ComponentRegistry;
pub use session::{EntryOutcome, InterpreterSession, SessionState};
