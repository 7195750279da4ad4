//! Status, log and utility bridge functions.
//!
//! - `set_status(text)`: set the device status label
//! - `add_log(text)`: write an information entry to the host log
//! - `iif(cond, a, b)`: ternary helper
//! - `get_last_simulation_time()`: `t_local, t_global, state`

use super::CallContext;
use crate::clock::NEVER_SIMULATED;
use mlua::{Lua, Table, Value};
use std::sync::Arc;

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &Arc<CallContext>) -> mlua::Result<()> {
    // set_status(text)
    let c = Arc::clone(ctx);
    let set_status = lua.create_function(move |_, status: String| {
        if let Some(device) = c.resolve("set status") {
            c.host().info(format!(
                "Lua script set status of {} to {status}",
                device.name()
            ));
            device.set_status(status);
        }
        Ok(())
    })?;
    globals.set("set_status", set_status)?;

    // add_log(text)
    let c = Arc::clone(ctx);
    let add_log = lua.create_function(move |_, message: String| {
        if let Some(device) = c.resolve("add log") {
            c.host().info(format!("{}:{message}", device.name()));
        }
        Ok(())
    })?;
    globals.set("add_log", add_log)?;

    // iif(cond, a, b) -> a | b | nil
    let c = Arc::clone(ctx);
    let iif = lua.create_function(move |_, (cond, if_true, if_false): (Value, Value, Value)| {
        let Some(device) = c.resolve("call iif") else {
            return Ok(Value::Nil);
        };
        match cond {
            Value::Boolean(true) => Ok(if_true),
            Value::Boolean(false) => Ok(if_false),
            other => {
                c.host().warn(format!(
                    "{} Lua script called iif with a non-boolean first parameter ({}). Check your script file.",
                    device.name(),
                    other.type_name()
                ));
                Ok(Value::Nil)
            }
        }
    })?;
    globals.set("iif", iif)?;

    // get_last_simulation_time() -> t_local, t_global, state
    let c = Arc::clone(ctx);
    let get_last_simulation_time = lua.create_function(move |_, ()| {
        let Some(device) = c.resolve("call get_last_simulation_time") else {
            return Ok((NEVER_SIMULATED, 0.0, 0_i64));
        };
        let clock = c.host().clock();
        Ok((
            c.env.times.last(device.id()),
            clock.current_time(),
            clock.state().code(),
        ))
    })?;
    globals.set("get_last_simulation_time", get_last_simulation_time)?;

    Ok(())
}
