//! Identifier types for station objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a device inside its project.
///
/// Opaque to the scripting core: ids are only compared and used as map keys.
/// Hosts that already have their own identifiers wrap them with
/// [`DeviceId::from_raw`]; the in-memory [`Station`](crate::Station) mints
/// random ones with [`DeviceId::new`].
///
/// # Example
///
/// ```
/// use rslua_station::DeviceId;
///
/// let a = DeviceId::from_raw("gripper-1");
/// assert_eq!(a.as_str(), "gripper-1");
/// assert_ne!(DeviceId::new(), DeviceId::new());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new random id (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing host identifier.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_uuids() {
        let id = DeviceId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DeviceId::from_raw("dev-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"dev-7\"");
    }
}
