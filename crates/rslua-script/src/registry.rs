//! Registry of live device handles.
//!
//! Hosts give no notification when a device disappears, so every access
//! starts with a sweep that evicts entries whose device is no longer
//! tracked by its project (see [`Device::is_tracked`]).

use crate::host::HostServices;
use parking_lot::Mutex;
use rslua_station::{Device, DeviceId};
use std::collections::HashMap;
use std::sync::Arc;

/// Device handles keyed by id.
#[derive(Debug)]
pub struct ComponentRegistry {
    entries: Mutex<HashMap<DeviceId, Arc<Device>>>,
    host: HostServices,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new(host: HostServices) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            host,
        }
    }

    /// Inserts or replaces the handle for `device.id()`.
    pub fn register(&self, device: Arc<Device>) {
        self.with_swept(|entries| {
            entries.insert(device.id().clone(), device);
        });
    }

    /// Looks up a live device by id.
    #[must_use]
    pub fn resolve(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.with_swept(|entries| entries.get(id).cloned())
    }

    /// Snapshot of every live device.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.with_swept(|entries| entries.values().cloned().collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.with_swept(|entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes an entry regardless of its validity.
    pub fn remove(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.entries.lock().remove(id)
    }

    /// Runs `f` on the entries after evicting every untracked device.
    ///
    /// Evictions are reported once the lock is released, so a host log
    /// that calls back into the bridge cannot deadlock.
    fn with_swept<R>(&self, f: impl FnOnce(&mut HashMap<DeviceId, Arc<Device>>) -> R) -> R {
        let mut evicted = Vec::new();
        let result = {
            let mut entries = self.entries.lock();
            entries.retain(|_, device| {
                let keep = device.is_tracked();
                if !keep {
                    evicted.push(device.name().to_string());
                }
                keep
            });
            f(&mut entries)
        };

        for name in evicted {
            self.host.info(format!(
                "Remove old component {name} from cache. Scripts only work with a named station."
            ));
        }
        result
    }
}
