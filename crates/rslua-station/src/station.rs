//! In-memory [`Project`] implementation.
//!
//! Used by the CLI host and by tests across the workspace. A station holds
//! devices (which carry signals and can be connected) and plain parts
//! (which cannot).

use crate::{Device, DeviceId, IoConnection, ObjectInfo, Project};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// An input signal whose value changed through connection propagation.
///
/// The host turns these into IO-signal-changed events.
#[derive(Debug, Clone)]
pub struct SignalChange {
    pub device: Arc<Device>,
    pub signal: String,
}

#[derive(Debug)]
enum StationObject {
    Device(Arc<Device>),
    Part { name: String },
}

impl StationObject {
    fn name(&self) -> &str {
        match self {
            Self::Device(device) => device.name(),
            Self::Part { name } => name,
        }
    }
}

/// A named project holding devices, parts and connections.
#[derive(Debug, Default)]
pub struct Station {
    name: Mutex<String>,
    objects: Mutex<Vec<StationObject>>,
    connections: Mutex<Vec<IoConnection>>,
    pending: Mutex<Vec<SignalChange>>,
}

impl Station {
    /// Creates an empty station.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: Mutex::new(name.into()),
            ..Self::default()
        })
    }

    /// Renames the station. An empty name makes its devices untrackable.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.lock() = name.into();
    }

    /// Creates a device owned by this station.
    pub fn add_device(self: &Arc<Self>, name: impl Into<String>) -> Arc<Device> {
        let weak = Arc::downgrade(self);
        let weak: Weak<dyn Project> = weak;
        let device = Arc::new(Device::new(DeviceId::new(), name, weak));
        self.objects
            .lock()
            .push(StationObject::Device(Arc::clone(&device)));
        device
    }

    /// Adds an object without signal capability.
    pub fn add_part(&self, name: impl Into<String>) {
        self.objects
            .lock()
            .push(StationObject::Part { name: name.into() });
    }

    /// Removes the first object with the given name.
    pub fn remove_object(&self, name: &str) -> bool {
        let mut objects = self.objects.lock();
        match objects.iter().position(|o| o.name() == name) {
            Some(pos) => {
                objects.remove(pos);
                true
            }
            None => false,
        }
    }

    /// All devices, in insertion order.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.objects
            .lock()
            .iter()
            .filter_map(|o| match o {
                StationObject::Device(d) => Some(Arc::clone(d)),
                StationObject::Part { .. } => None,
            })
            .collect()
    }

    #[must_use]
    pub fn device_by_name(&self, name: &str) -> Option<Arc<Device>> {
        self.devices().into_iter().find(|d| d.name() == name)
    }

    /// Drains input changes produced by connection propagation.
    pub fn take_pending_changes(&self) -> Vec<SignalChange> {
        std::mem::take(&mut *self.pending.lock())
    }
}

impl Project for Station {
    fn name(&self) -> String {
        self.name.lock().clone()
    }

    fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices().into_iter().find(|d| d.id() == id)
    }

    fn find_object(&self, name: &str) -> Option<ObjectInfo> {
        self.objects
            .lock()
            .iter()
            .find(|o| o.name() == name)
            .map(|o| ObjectInfo {
                name: o.name().to_string(),
                supports_connections: matches!(o, StationObject::Device(_)),
            })
    }

    fn connections(&self) -> Vec<IoConnection> {
        self.connections.lock().clone()
    }

    fn add_connection(&self, connection: IoConnection) {
        self.connections.lock().push(connection);
    }

    fn update_connections_to(&self, object: &str) {
        let Some(target) = self.device_by_name(object) else {
            return;
        };
        let incoming: Vec<IoConnection> = self
            .connections()
            .into_iter()
            .filter(|c| c.target_object == object)
            .collect();

        for conn in incoming {
            let Some(value) = self
                .device_by_name(&conn.source_object)
                .and_then(|source| source.signal_value(&conn.source_signal))
            else {
                tracing::debug!(
                    source = %conn.source_object,
                    signal = %conn.source_signal,
                    "Connection source not found, skipping"
                );
                continue;
            };

            let changed = target.with_signals(|store| {
                let before = store.get(&conn.target_signal).map(|s| (s.value, s.kind));
                let after = store.set_value(&conn.target_signal, value);
                match (before, after) {
                    (Some((old, kind)), Some(new)) => old != new && kind.is_input(),
                    _ => false,
                }
            });

            if changed {
                self.pending.lock().push(SignalChange {
                    device: Arc::clone(&target),
                    signal: conn.target_signal.clone(),
                });
            }
        }
    }
}
