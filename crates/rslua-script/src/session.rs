//! Interpreter lifecycle for one device.
//!
//! # State Machine
//!
//! ```text
//!              load()                 run ok
//! Unloaded ──────────▶ Loading ─────────────────▶ Ready
//!    ▲                   │                          │
//!    │ empty path        │ read / compile / run     │ bridge call with
//!    └───────────────────┤ failure                  │ unresolvable device,
//!                        ▼                          │ or close()
//!                      Error                        ▼
//!                                                 Closed
//! ```
//!
//! `load()` re-enters `Loading` from any state and always releases the
//! previous interpreter before allocating a new one.

use crate::bridge::{self, BridgeEnv, CallContext};
use crate::error::ScriptError;
use mlua::{IntoLuaMulti, Lua, Value};
use rslua_station::DeviceId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Chunk name used in Lua error messages.
const CHUNK_NAME: &str = "program";

/// Lifecycle state of an [`InterpreterSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No script configured.
    #[default]
    Unloaded,
    /// Reading, compiling or running the script's top level.
    Loading,
    /// Top level ran; entry points can be dispatched.
    Ready,
    /// The last load failed. No interpreter is held.
    Error,
    /// Closed because its device went away. No interpreter is held.
    Closed,
}

/// Result of dispatching an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Session not `Ready`; nothing was called.
    NotReady,
    /// The script does not define the entry point.
    Missing,
    /// Called and returned nothing.
    Completed,
    /// Raised an error or returned a non-nil value. The session stays `Ready`.
    Failed(String),
    /// A bridge call could not resolve the device; the session is now `Closed`.
    Closed,
}

/// One device's interpreter and its lifecycle state.
pub struct InterpreterSession {
    device_id: DeviceId,
    state: SessionState,
    lua: Option<Lua>,
    /// Set by bridge functions that fail to resolve the device.
    close_requested: Arc<AtomicBool>,
}

impl std::fmt::Debug for InterpreterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterSession")
            .field("device_id", &self.device_id)
            .field("state", &self.state)
            .field("live", &self.lua.is_some())
            .finish()
    }
}

impl InterpreterSession {
    #[must_use]
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            state: SessionState::Unloaded,
            lua: None,
            close_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` while an interpreter is allocated.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.lua.is_some()
    }

    /// Loads the script at `path`, replacing any previous interpreter.
    ///
    /// An empty path leaves the session `Unloaded`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::FileAccess`] if the file cannot be read, and
    /// any error of [`load_source`](Self::load_source).
    pub fn load(&mut self, path: &str, env: &BridgeEnv) -> Result<(), ScriptError> {
        self.state = SessionState::Loading;
        self.release();

        if path.is_empty() {
            tracing::debug!(device = %self.device_id, "No script path configured");
            self.state = SessionState::Unloaded;
            return Ok(());
        }

        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                self.state = SessionState::Error;
                return Err(ScriptError::file_access(path, e));
            }
        };

        self.load_source(&source, env)
    }

    /// Compiles and runs `source` in a fresh interpreter.
    ///
    /// # Errors
    ///
    /// - [`ScriptError::Compile`] if the source does not compile
    /// - [`ScriptError::Runtime`] if the top-level run raises
    /// - [`ScriptError::UnknownDevice`] if a bridge call during the run
    ///   could not resolve the device (session is then `Closed`)
    /// - [`ScriptError::Lua`] if the interpreter could not be set up
    pub fn load_source(&mut self, source: &str, env: &BridgeEnv) -> Result<(), ScriptError> {
        self.state = SessionState::Loading;
        self.release();
        self.close_requested = Arc::new(AtomicBool::new(false));

        let started = self.start(source, env);
        if self.take_close_request() {
            drop(started);
            self.close();
            return Err(ScriptError::UnknownDevice(self.device_id.clone()));
        }

        match started {
            Ok(lua) => {
                self.lua = Some(lua);
                self.state = SessionState::Ready;
                tracing::debug!(device = %self.device_id, "Script loaded");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Error;
                Err(e)
            }
        }
    }

    /// Builds the interpreter, installs the bridge and runs the top level.
    ///
    /// The interpreter is dropped on every error path.
    fn start(&self, source: &str, env: &BridgeEnv) -> Result<Lua, ScriptError> {
        let lua = Lua::new();
        let ctx = CallContext::new(
            env.clone(),
            self.device_id.clone(),
            Arc::clone(&self.close_requested),
        );
        bridge::install(&lua, Arc::new(ctx))?;

        let main = lua
            .load(source)
            .set_name(CHUNK_NAME)
            .into_function()
            .map_err(|e| ScriptError::Compile(e.to_string()))?;

        main.call::<()>(())
            .map_err(|e| ScriptError::Runtime(e.to_string()))?;
        drop(main);

        Ok(lua)
    }

    /// Calls the global function `name` if the session is `Ready`.
    ///
    /// The global is looked up on every call, so scripts may define or
    /// replace entry points at any time.
    pub fn call_entry_point(&mut self, name: &str, args: impl IntoLuaMulti) -> EntryOutcome {
        if self.state != SessionState::Ready {
            return EntryOutcome::NotReady;
        }
        let Some(lua) = &self.lua else {
            return EntryOutcome::NotReady;
        };

        let outcome = match lua.globals().get::<Value>(name) {
            Ok(Value::Function(entry)) => match entry.call::<Value>(args) {
                Ok(Value::Nil) => EntryOutcome::Completed,
                Ok(returned) => EntryOutcome::Failed(describe(&returned)),
                Err(e) => EntryOutcome::Failed(e.to_string()),
            },
            Ok(_) => EntryOutcome::Missing,
            Err(e) => EntryOutcome::Failed(e.to_string()),
        };

        if self.take_close_request() {
            self.close();
            return EntryOutcome::Closed;
        }
        outcome
    }

    /// Releases the interpreter and enters `Closed`.
    pub fn close(&mut self) {
        self.release();
        self.state = SessionState::Closed;
    }

    fn release(&mut self) {
        if self.lua.take().is_some() {
            tracing::debug!(device = %self.device_id, "Closed interpreter");
        }
    }

    fn take_close_request(&self) -> bool {
        self.close_requested.swap(false, Ordering::SeqCst)
    }
}

/// Renders a value returned by an entry point for the host log.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string_lossy().to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests;
