//! Host functions installed into every interpreter.
//!
//! Registers the following globals, split by responsibility:
//! - [`status_fns`]: `set_status`, `add_log`, `iif`, `get_last_simulation_time`
//! - [`signal_fns`]: `clear_signals`, `add_signal`, `get_signal`, `set_signal`
//! - [`connection_fns`]: `add_io_connection`
//!
//! plus the read-only `SmartComponent` global holding the device id.
//!
//! Every function is a closure over a shared [`CallContext`] and starts by
//! resolving the bound device id through the registry. If that fails the
//! function reports an error, asks the session to close the interpreter,
//! and returns its neutral default.

mod connection_fns;
mod signal_fns;
mod status_fns;

use crate::clock::SimulationTimes;
use crate::host::HostServices;
use crate::registry::ComponentRegistry;
use mlua::{Lua, Table, Value};
use rslua_station::{Device, DeviceId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name of the global holding the device id.
pub const COMPONENT_GLOBAL: &str = "SmartComponent";

/// Names of every bridge function, in registration order.
pub const BRIDGE_FUNCTIONS: [&str; 9] = [
    "set_status",
    "add_log",
    "clear_signals",
    "add_signal",
    "get_signal",
    "set_signal",
    "iif",
    "get_last_simulation_time",
    "add_io_connection",
];

/// Shared state every session's bridge functions are bound over.
#[derive(Debug, Clone)]
pub struct BridgeEnv {
    pub registry: Arc<ComponentRegistry>,
    pub times: Arc<SimulationTimes>,
    pub host: HostServices,
}

/// Per-interpreter context captured by bridge closures.
pub(crate) struct CallContext {
    env: BridgeEnv,
    device_id: DeviceId,
    close_requested: Arc<AtomicBool>,
}

impl CallContext {
    pub(crate) fn new(env: BridgeEnv, device_id: DeviceId, close_requested: Arc<AtomicBool>) -> Self {
        Self {
            env,
            device_id,
            close_requested,
        }
    }

    fn host(&self) -> &HostServices {
        &self.env.host
    }

    /// Resolves the bound device, or requests the interpreter's closure.
    ///
    /// `action` completes the sentence "Lua script ... of unknown component".
    fn resolve(&self, action: &str) -> Option<Arc<Device>> {
        if let Some(device) = self.env.registry.resolve(&self.device_id) {
            return Some(device);
        }
        self.host().error(format!(
            "Lua script {action} of unknown component. Closing it."
        ));
        tracing::warn!(device = %self.device_id, "Requesting interpreter close");
        self.close_requested.store(true, Ordering::SeqCst);
        None
    }
}

/// Installs all bridge globals into `lua`.
pub(crate) fn install(lua: &Lua, ctx: Arc<CallContext>) -> mlua::Result<()> {
    let globals = lua.globals();

    bind_component_id(lua, &globals, ctx.device_id.as_str())?;
    status_fns::register(lua, &globals, &ctx)?;
    signal_fns::register(lua, &globals, &ctx)?;
    connection_fns::register(lua, &globals, &ctx)?;

    tracing::debug!(device = %ctx.device_id, "Registered bridge functions");
    Ok(())
}

/// Exposes the device id as a read-only global.
///
/// The value lives behind the globals metatable rather than in the table
/// itself, so plain assignment reaches `__newindex` and can be refused.
fn bind_component_id(lua: &Lua, globals: &Table, id: &str) -> mlua::Result<()> {
    let id = id.to_string();
    let meta = lua.create_table()?;

    let index = lua.create_function(move |lua, (_, key): (Table, Value)| {
        if is_component_key(&key) {
            return Ok(Value::String(lua.create_string(&id)?));
        }
        Ok(Value::Nil)
    })?;
    meta.set("__index", index)?;

    let newindex = lua.create_function(|_, (table, key, value): (Table, Value, Value)| {
        if is_component_key(&key) {
            return Err(mlua::Error::RuntimeError(format!(
                "{COMPONENT_GLOBAL} is read-only"
            )));
        }
        table.raw_set(key, value)
    })?;
    meta.set("__newindex", newindex)?;

    globals.set_metatable(Some(meta));
    Ok(())
}

fn is_component_key(key: &Value) -> bool {
    matches!(key, Value::String(s) if s.to_string_lossy() == COMPONENT_GLOBAL)
}
