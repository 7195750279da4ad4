//! Signal bridge functions.
//!
//! - `clear_signals()`: remove every signal except the control signal
//! - `add_signal(name, kind)`: add a read-only signal
//! - `get_signal(name)`: `value`, or `nil, "no such signal: <name>"`
//! - `set_signal(name, value)`: write a value, coerced by kind

use super::CallContext;
use mlua::{Lua, Table};
use rslua_station::{Signal, SignalKind, CONTROL_SIGNAL};
use std::sync::Arc;

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &Arc<CallContext>) -> mlua::Result<()> {
    // clear_signals()
    let c = Arc::clone(ctx);
    let clear_signals = lua.create_function(move |_, ()| {
        if let Some(device) = c.resolve("clear all signals") {
            device.with_signals(|store| store.retain(|s| s.name == CONTROL_SIGNAL));
            c.host().info(format!(
                "Lua script clear all signals of {}",
                device.name()
            ));
            device.set_status("Cleared");
        }
        Ok(())
    })?;
    globals.set("clear_signals", clear_signals)?;

    // add_signal(name, kind)
    let c = Arc::clone(ctx);
    let add_signal = lua.create_function(move |_, (name, kind): (String, String)| {
        let Some(device) = c.resolve("adding signal") else {
            return Ok(());
        };
        let kind = SignalKind::parse_lenient(&kind);
        let added =
            device.with_signals(|store| store.add(Signal::new(name.as_str(), kind).read_only()));
        if added {
            c.host().info(format!(
                "Lua script adding signal {name} to {}",
                device.name()
            ));
        } else {
            c.host().info(format!(
                "Lua script want to add already existing signal {name} to {}. Check your script file.",
                device.name()
            ));
        }
        device.set_status("Signal Added");
        Ok(())
    })?;
    globals.set("add_signal", add_signal)?;

    // get_signal(name) -> value | nil, message
    let c = Arc::clone(ctx);
    let get_signal = lua.create_function(move |_, name: String| {
        let Some(device) = c.resolve("get signal value") else {
            return Ok((None, None));
        };
        match device.signal_value(&name) {
            Some(value) => Ok((Some(value), None)),
            None => {
                c.host().warn(format!(
                    "Lua script get signal value of unknown signal named: {name}. Check your script file."
                ));
                Ok((None, Some(format!("no such signal: {name}"))))
            }
        }
    })?;
    globals.set("get_signal", get_signal)?;

    // set_signal(name, value)
    let c = Arc::clone(ctx);
    let set_signal = lua.create_function(move |_, (name, value): (String, f64)| {
        let Some(device) = c.resolve("set signal value") else {
            return Ok(());
        };
        if device.with_signals(|store| store.set_value(&name, value)).is_none() {
            c.host().warn(format!(
                "Lua script set signal value of unknown signal named: {name}. Check your script file."
            ));
        }
        Ok(())
    })?;
    globals.set("set_signal", set_signal)?;

    Ok(())
}
