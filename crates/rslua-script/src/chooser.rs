//! Script selection triggered by the `LoadFile` control signal.

use rslua_station::Device;

/// Lets the user pick a script file for a device.
///
/// Hosts with a UI open a file dialog here. Headless hosts use
/// [`NoChooser`].
pub trait ScriptChooser: Send {
    /// Returns the selected path, or `None` if the user cancelled.
    ///
    /// `current` is the device's stored path (possibly empty).
    fn choose(&self, device: &Device, current: &str) -> Option<String>;

    /// Asked when the user selected the path that is already stored.
    /// Returning `true` reloads the script.
    fn confirm_reopen(&self, _device: &Device) -> bool {
        true
    }
}

/// A chooser that never selects anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChooser;

impl ScriptChooser for NoChooser {
    fn choose(&self, _device: &Device, _current: &str) -> Option<String> {
        None
    }
}

/// What the dispatcher does with a chooser's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selection {
    Unchanged,
    Reopen,
    NewPath(String),
}

/// Asks `chooser` for a script and classifies the answer.
pub(crate) fn select(chooser: &dyn ScriptChooser, device: &Device) -> Selection {
    let current = device.script_path();
    match chooser.choose(device, &current) {
        None => Selection::Unchanged,
        Some(path) if path == current => {
            if chooser.confirm_reopen(device) {
                Selection::Reopen
            } else {
                Selection::Unchanged
            }
        }
        Some(path) => Selection::NewPath(path),
    }
}
