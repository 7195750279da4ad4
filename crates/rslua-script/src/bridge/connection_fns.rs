//! `add_io_connection(srcObj, srcSig, dstObj, dstSig, allowCycle = true) -> bool`
//!
//! An empty object name stands for the calling device. Both endpoints are
//! looked up by name in the device's project.

use super::CallContext;
use mlua::{Lua, Table, Value};
use rslua_station::{Device, IoConnection, ObjectInfo, Project};
use std::sync::Arc;

pub(super) fn register(lua: &Lua, globals: &Table, ctx: &Arc<CallContext>) -> mlua::Result<()> {
    let c = Arc::clone(ctx);
    let add_io_connection = lua.create_function(
        move |_,
              (source_object, source_signal, target_object, target_signal, allow_cycle): (
            String,
            String,
            String,
            String,
            Value,
        )| {
            let Some(device) = c.resolve("call add_io_connection") else {
                return Ok(false);
            };
            let Some(project) = device.project() else {
                return Ok(false);
            };

            // Cyclic connections are allowed unless explicitly refused.
            let allow_cycle = match allow_cycle {
                Value::Boolean(b) => b,
                _ => true,
            };

            let (source_name, source) = endpoint(project.as_ref(), &device, source_object);
            let (target_name, target) = endpoint(project.as_ref(), &device, target_object);

            if source.is_none() {
                c.host().warn(format!(
                    "{}: Failed to find {source_name} as source to create new connection.",
                    device.name()
                ));
            }
            if target.is_none() {
                c.host().warn(format!(
                    "{}: Failed to find {target_name} as target to create new connection.",
                    device.name()
                ));
            }
            let (Some(source), Some(target)) = (source, target) else {
                return Ok(false);
            };

            for object in [&source, &target] {
                if !object.supports_connections {
                    c.host().warn(format!(
                        "{}: {} should be an object with I/O signals.",
                        device.name(),
                        object.name
                    ));
                    return Ok(false);
                }
            }

            let connection = IoConnection {
                source_object: source_name,
                source_signal,
                target_object: target_name,
                target_signal,
                allow_cycle,
            };

            if project
                .connections()
                .iter()
                .any(|existing| existing.same_endpoints(&connection))
            {
                c.host().warn(format!(
                    "{}: Failed to create connection from {}.{} to {}.{}, because it already exists.",
                    device.name(),
                    connection.source_object,
                    connection.source_signal,
                    connection.target_object,
                    connection.target_signal
                ));
                return Ok(false);
            }

            tracing::debug!(
                device = %device.id(),
                source = %connection.source_object,
                target = %connection.target_object,
                "Adding IO connection"
            );
            project.add_connection(connection);
            Ok(true)
        },
    )?;
    globals.set("add_io_connection", add_io_connection)?;

    Ok(())
}

/// Resolves one endpoint; an empty name means the calling device.
fn endpoint(project: &dyn Project, device: &Device, name: String) -> (String, Option<ObjectInfo>) {
    if name.is_empty() {
        let own = ObjectInfo {
            name: device.name().to_string(),
            supports_connections: true,
        };
        return (own.name.clone(), Some(own));
    }
    let found = project.find_object(&name);
    (name, found)
}
