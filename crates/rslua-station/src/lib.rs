//! Host object model consumed by the rslua scripting core.
//!
//! The scripting core never owns host objects. It sees them through:
//!
//! | Item | Role |
//! |------|------|
//! | [`Device`] | A simulated object: id, name, signals, status, script path |
//! | [`Project`] | Owner of devices and of the connections between objects |
//! | [`SimulationClock`] | Global simulation time and run state |
//! | [`HostLog`] | The host's log window |
//!
//! [`Station`], [`ManualClock`] and [`MemoryLog`] are in-memory
//! implementations used by the CLI host and by tests.
//!
//! # Example
//!
//! ```
//! use rslua_station::{Signal, SignalKind, Station, CONTROL_SIGNAL};
//!
//! let station = Station::new("Cell");
//! let gripper = station.add_device("Gripper");
//! gripper.with_signals(|s| s.add(Signal::new("Close", SignalKind::DigitalOutput)));
//!
//! assert!(gripper.is_tracked());
//! assert!(gripper.signals().contains(CONTROL_SIGNAL));
//! ```

mod clock;
mod device;
mod id;
mod log;
mod project;
mod signal;
mod station;

pub use clock::{ManualClock, SimulationClock, SimulationState};
pub use device::Device;
pub use id::DeviceId;
pub use log::{HostLog, LogMessage, MemoryLog, Severity};
pub use project::{IoConnection, ObjectInfo, Project};
pub use signal::{Signal, SignalKind, SignalKindError, SignalStore, CONTROL_SIGNAL};
pub use station::{SignalChange, Station};
