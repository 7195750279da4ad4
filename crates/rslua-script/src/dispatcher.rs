//! Routes host events to device sessions.
//!
//! The host calls one `on_*` method per event. Every handler registers the
//! device first, so bridge functions of its script can resolve it.
//!
//! | Host event | Handler | Entry point called |
//! |------------|---------|--------------------|
//! | device loaded | [`attach`](EventDispatcher::attach) | none |
//! | script path edited | [`on_script_path_changed`](EventDispatcher::on_script_path_changed) | none (reload) |
//! | input signal changed | [`on_io_signal_changed`](EventDispatcher::on_io_signal_changed) | `on_io_signal_value_changed(name, value)` |
//! | simulation step | [`on_simulation_step`](EventDispatcher::on_simulation_step) | `on_simulation_step()` |
//! | library replaced | [`on_library_replaced`](EventDispatcher::on_library_replaced) | `on_io_signal_value_changed("", 0)` |
//! | log message | [`on_log_message`](EventDispatcher::on_log_message) | same as library replaced, for every device |

use crate::bridge::BridgeEnv;
use crate::chooser::{self, NoChooser, ScriptChooser, Selection};
use crate::clock::SimulationTimes;
use crate::config::ScriptConfig;
use crate::error::ScriptError;
use crate::host::HostServices;
use crate::registry::ComponentRegistry;
use crate::session::{EntryOutcome, InterpreterSession, SessionState};
use mlua::IntoLuaMulti;
use rslua_station::{Device, DeviceId, HostLog, SimulationClock, CONTROL_SIGNAL};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Entry point called when an input signal changes.
pub const ON_IO_SIGNAL_VALUE_CHANGED: &str = "on_io_signal_value_changed";

/// Entry point called on every simulation step.
pub const ON_SIMULATION_STEP: &str = "on_simulation_step";

/// Status label set after a successful load.
pub const STATUS_LOADED: &str = "File loaded";

/// Owns every session and routes host events to them.
pub struct EventDispatcher {
    env: BridgeEnv,
    config: ScriptConfig,
    chooser: Box<dyn ScriptChooser>,
    sessions: HashMap<DeviceId, InterpreterSession>,
    last_refresh: Option<Instant>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .field("last_refresh", &self.last_refresh)
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    #[must_use]
    pub fn new(
        log: Arc<dyn HostLog>,
        clock: Arc<dyn SimulationClock>,
        config: ScriptConfig,
    ) -> Self {
        let host = HostServices::new(log, clock, config.log_prefix.clone());
        let env = BridgeEnv {
            registry: Arc::new(ComponentRegistry::new(host.clone())),
            times: Arc::new(SimulationTimes::new()),
            host,
        };
        Self {
            env,
            config,
            chooser: Box::new(NoChooser),
            sessions: HashMap::new(),
            last_refresh: None,
        }
    }

    /// Replaces the chooser used for `LoadFile` requests.
    #[must_use]
    pub fn with_chooser(mut self, chooser: impl ScriptChooser + 'static) -> Self {
        self.chooser = Box::new(chooser);
        self
    }

    /// Registers a device the host just loaded.
    #[tracing::instrument(skip_all, fields(device = %device.name()))]
    pub fn attach(&mut self, device: &Arc<Device>) {
        self.env.registry.register(Arc::clone(device));
        tracing::debug!(id = %device.id(), "Attached device");
    }

    /// Reloads the script after the host changed the stored path.
    #[tracing::instrument(skip_all, fields(device = %device.name()))]
    pub fn on_script_path_changed(&mut self, device: &Arc<Device>) {
        self.env.registry.register(Arc::clone(device));
        self.reload(device);
    }

    /// Handles a signal value change on `device`.
    ///
    /// `LoadFile = 1` opens the script chooser. Changes of input signals are
    /// forwarded to the script; output changes are ignored.
    #[tracing::instrument(skip(self, device), fields(device = %device.name()))]
    pub fn on_io_signal_changed(&mut self, device: &Arc<Device>, signal: &str) {
        self.env.registry.register(Arc::clone(device));

        let Some((kind, value)) =
            device.with_signals(|store| store.get(signal).map(|s| (s.kind, s.value)))
        else {
            tracing::debug!("Signal not found, ignoring change");
            return;
        };

        if signal == CONTROL_SIGNAL {
            if value == 1.0 {
                self.choose_script(device);
            }
            return;
        }

        if !kind.is_input() {
            return;
        }
        self.ensure(device);
        self.dispatch(
            device,
            ON_IO_SIGNAL_VALUE_CHANGED,
            (signal.to_string(), value),
        );
    }

    /// Handles one simulation step of `device`.
    ///
    /// Connections targeting the device are re-evaluated first, since an
    /// input change does not always propagate on its own.
    #[tracing::instrument(skip(self, device), fields(device = %device.name()))]
    pub fn on_simulation_step(&mut self, device: &Arc<Device>, time: f64, previous: f64) {
        if let Some(project) = device.project() {
            project.update_connections_to(device.name());
        }
        self.env.times.record(device.id(), time);

        self.env.registry.register(Arc::clone(device));
        self.ensure(device);
        self.dispatch(device, ON_SIMULATION_STEP, ());
    }

    /// Re-dispatches an empty IO update after the host swapped the library.
    #[tracing::instrument(skip_all, fields(device = %device.name()))]
    pub fn on_library_replaced(&mut self, device: &Arc<Device>) {
        self.env.registry.register(Arc::clone(device));
        self.refresh(device);
    }

    /// Inspects a host log message for the refresh marker.
    ///
    /// Messages written by the bridge itself (starting with the log prefix)
    /// are ignored. Returns `true` if a refresh broadcast ran.
    pub fn on_log_message(&mut self, text: &str) -> bool {
        if text.starts_with(self.env.host.prefix()) {
            return false;
        }
        if self.config.refresh_marker.is_empty() || !text.contains(&self.config.refresh_marker)
        {
            return false;
        }

        let now = Instant::now();
        if let Some(last) = self.last_refresh {
            if now.duration_since(last) < self.config.refresh_debounce() {
                tracing::debug!("Refresh request within debounce window, ignoring");
                return false;
            }
        }

        for device in self.env.registry.devices() {
            self.refresh(&device);
            self.env
                .host
                .info(format!("Updating component {}", device.name()));
        }
        self.last_refresh = Some(now);
        true
    }

    /// Closes and forgets everything held for `id`.
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self, id: &DeviceId) {
        if let Some(mut session) = self.sessions.remove(id) {
            session.close();
        }
        self.env.times.forget(id);
        self.env.registry.remove(id);
    }

    /// State of the session for `id`, if one was ever created.
    #[must_use]
    pub fn session_state(&self, id: &DeviceId) -> Option<SessionState> {
        self.sessions.get(id).map(InterpreterSession::state)
    }

    /// Number of sessions currently holding an interpreter.
    #[must_use]
    pub fn live_interpreters(&self) -> usize {
        self.sessions.values().filter(|s| s.is_live()).count()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.env.registry
    }

    #[must_use]
    pub fn times(&self) -> &Arc<SimulationTimes> {
        &self.env.times
    }

    /// Loads the device's stored script into a fresh interpreter.
    fn reload(&mut self, device: &Arc<Device>) {
        let path = device.script_path();
        let session = self
            .sessions
            .entry(device.id().clone())
            .or_insert_with(|| InterpreterSession::new(device.id().clone()));

        match session.load(&path, &self.env) {
            Ok(()) if session.state() == SessionState::Ready => {
                device.set_status(STATUS_LOADED);
                tracing::info!(path = %path, "Loaded script");
            }
            Ok(()) => {}
            Err(e) => {
                self.env.host.error(format!("{}: {e}.", device.name()));
                if e.clears_path() {
                    device.set_script_path("");
                    device.set_status(failure_status(&e));
                }
            }
        }

        self.warn_acyclic(device);
    }

    /// Creates the session on first use.
    fn ensure(&mut self, device: &Arc<Device>) {
        if !self.sessions.contains_key(device.id()) {
            self.reload(device);
        }
    }

    fn refresh(&mut self, device: &Arc<Device>) {
        self.ensure(device);
        self.dispatch(device, ON_IO_SIGNAL_VALUE_CHANGED, (String::new(), 0.0));
    }

    fn dispatch(&mut self, device: &Device, entry: &str, args: impl IntoLuaMulti) {
        let Some(session) = self.sessions.get_mut(device.id()) else {
            return;
        };
        match session.call_entry_point(entry, args) {
            EntryOutcome::Failed(message) => {
                self.env
                    .host
                    .error(format!("{}: {entry} returns: {message}.", device.name()));
            }
            EntryOutcome::Closed => {
                tracing::warn!(entry, "Session closed during entry point");
            }
            EntryOutcome::NotReady | EntryOutcome::Missing | EntryOutcome::Completed => {}
        }
    }

    fn choose_script(&mut self, device: &Arc<Device>) {
        match chooser::select(self.chooser.as_ref(), device) {
            Selection::Unchanged => {}
            Selection::Reopen => self.reload(device),
            Selection::NewPath(path) => {
                device.set_script_path(path);
                self.reload(device);
            }
        }
    }

    /// Warns about connections touching `device` that refuse cycles.
    fn warn_acyclic(&self, device: &Device) {
        if !self.config.warn_acyclic_connections {
            return;
        }
        let Some(project) = device.project() else {
            return;
        };
        let name = device.name();
        for conn in project
            .connections()
            .iter()
            .filter(|c| !c.allow_cycle && c.touches(name))
        {
            if conn.source_object == name {
                self.env.host.warn(format!(
                    "{name}: Connection from {} to {}.{} should allow cyclic connection.",
                    conn.source_signal, conn.target_object, conn.target_signal
                ));
            }
            if conn.target_object == name {
                self.env.host.warn(format!(
                    "{name}: Connection from {}.{} to {} should allow cyclic connection.",
                    conn.source_object, conn.source_signal, conn.target_signal
                ));
            }
        }
    }
}

/// Short status label for a failed load.
fn failure_status(error: &ScriptError) -> &'static str {
    match error {
        ScriptError::FileAccess { .. } => "Can't open file",
        ScriptError::Compile(_) => "Load error",
        ScriptError::Runtime(_) => "Run error",
        ScriptError::UnknownDevice(_) | ScriptError::Lua(_) => "Error",
    }
}
