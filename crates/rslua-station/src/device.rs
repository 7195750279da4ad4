//! Device handles.

use crate::{DeviceId, Project, Signal, SignalKind, SignalStore, CONTROL_SIGNAL};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// A simulated object that can host one script.
///
/// Interior state is behind mutexes so handles can be shared as
/// `Arc<Device>` between the host, the registry and interpreter callbacks.
/// Locks are held only for the duration of a single accessor.
pub struct Device {
    id: DeviceId,
    name: String,
    project: Weak<dyn Project>,
    signals: Mutex<SignalStore>,
    status: Mutex<String>,
    script_path: Mutex<String>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &*self.status.lock())
            .field("script_path", &*self.script_path.lock())
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Creates a device owned by `project`, carrying the control signal.
    #[must_use]
    pub fn new(id: DeviceId, name: impl Into<String>, project: Weak<dyn Project>) -> Self {
        let mut signals = SignalStore::new();
        signals.add(Signal::new(CONTROL_SIGNAL, SignalKind::DigitalInput));
        Self {
            id,
            name: name.into(),
            project,
            signals: Mutex::new(signals),
            status: Mutex::new(String::new()),
            script_path: Mutex::new(String::new()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upgrades the weak project reference.
    #[must_use]
    pub fn project(&self) -> Option<Arc<dyn Project>> {
        self.project.upgrade()
    }

    /// Returns `true` while the owning project is alive, named, and still
    /// resolves this device's id to this very object.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        let Some(project) = self.project() else {
            return false;
        };
        if project.name().is_empty() {
            return false;
        }
        project
            .device(&self.id)
            .is_some_and(|found| std::ptr::eq(Arc::as_ptr(&found), self))
    }

    /// Runs `f` with exclusive access to the signal store.
    pub fn with_signals<R>(&self, f: impl FnOnce(&mut SignalStore) -> R) -> R {
        f(&mut self.signals.lock())
    }

    /// Returns the current value of a signal.
    #[must_use]
    pub fn signal_value(&self, name: &str) -> Option<f64> {
        self.signals.lock().get(name).map(|s| s.value)
    }

    /// Snapshot of all signals.
    #[must_use]
    pub fn signals(&self) -> SignalStore {
        self.signals.lock().clone()
    }

    #[must_use]
    pub fn status(&self) -> String {
        self.status.lock().clone()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        *self.status.lock() = status.into();
    }

    /// The configured script file path (empty if none).
    #[must_use]
    pub fn script_path(&self) -> String {
        self.script_path.lock().clone()
    }

    /// Stores the script path. Does not trigger a reload by itself.
    pub fn set_script_path(&self, path: impl Into<String>) {
        *self.script_path.lock() = path.into();
    }
}
