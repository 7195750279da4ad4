//! TOML station descriptions.
//!
//! ```toml
//! name = "Cell"
//!
//! [[device]]
//! name = "Gripper"
//! script = "gripper.lua"        # relative to this file
//! signals = [{ name = "Closed", kind = "DigitalInput", value = 0 }]
//!
//! [[part]]
//! name = "Table"
//!
//! [[connection]]
//! source_object = "Sensor"
//! source_signal = "Out"
//! target_object = "Gripper"
//! target_signal = "Closed"
//! allow_cycle = true            # optional, default true
//! ```

use rslua_station::{Device, IoConnection, Project, Signal, SignalKind, SignalKindError, Station};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while reading a station description.
#[derive(Debug, Error)]
pub enum StationFileError {
    #[error("failed to read station file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse station file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("device {device}: {source}")]
    SignalKind {
        device: String,
        #[source]
        source: SignalKindError,
    },

    #[error("duplicate object name: {0}")]
    DuplicateObject(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationFile {
    pub name: String,
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceEntry>,
    #[serde(default, rename = "part")]
    pub parts: Vec<PartEntry>,
    #[serde(default, rename = "connection")]
    pub connections: Vec<IoConnection>,
    /// Directory the file was read from; script paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEntry {
    pub name: String,
    #[serde(default)]
    pub script: Option<PathBuf>,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalEntry {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartEntry {
    pub name: String,
}

/// A device built from its entry, with its resolved script path.
#[derive(Debug)]
pub struct BuiltDevice {
    pub device: Arc<Device>,
    pub script: Option<PathBuf>,
}

impl StationFile {
    /// Reads and parses a station file.
    pub fn load(path: &Path) -> Result<Self, StationFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| StationFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file: Self = toml::from_str(&content).map_err(|source| StationFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        file.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(file)
    }

    /// Builds the in-memory station.
    ///
    /// Scripts are only resolved here; loading them is left to the
    /// dispatcher so that load failures surface through the host log.
    pub fn build(&self) -> Result<(Arc<Station>, Vec<BuiltDevice>), StationFileError> {
        let mut names: Vec<&str> = Vec::new();
        for name in self
            .devices
            .iter()
            .map(|d| d.name.as_str())
            .chain(self.parts.iter().map(|p| p.name.as_str()))
        {
            if names.contains(&name) {
                return Err(StationFileError::DuplicateObject(name.to_string()));
            }
            names.push(name);
        }

        let station = Station::new(self.name.as_str());
        let mut built = Vec::with_capacity(self.devices.len());

        for entry in &self.devices {
            let device = station.add_device(entry.name.as_str());
            for signal in &entry.signals {
                let kind: SignalKind =
                    signal
                        .kind
                        .parse()
                        .map_err(|source| StationFileError::SignalKind {
                            device: entry.name.clone(),
                            source,
                        })?;
                device.with_signals(|store| {
                    let mut s = Signal::new(signal.name.as_str(), kind);
                    s.value = kind.coerce(signal.value);
                    store.add(s)
                });
            }
            let script = entry.script.as_ref().map(|p| self.base_dir.join(p));
            built.push(BuiltDevice { device, script });
        }

        for part in &self.parts {
            station.add_part(part.name.as_str());
        }
        for connection in &self.connections {
            station.add_connection(connection.clone());
        }

        tracing::debug!(
            station = %self.name,
            devices = built.len(),
            parts = self.parts.len(),
            connections = self.connections.len(),
            "Built station"
        );
        Ok((station, built))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CELL: &str = r#"
name = "Cell"

[[device]]
name = "Gripper"
script = "gripper.lua"
signals = [{ name = "Closed", kind = "DigitalInput", value = 3 }]

[[device]]
name = "Sensor"

[[part]]
name = "Table"

[[connection]]
source_object = "Sensor"
source_signal = "Out"
target_object = "Gripper"
target_signal = "Closed"
"#;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("station.toml");
        std::fs::write(&path, content).expect("write station file");
        path
    }

    #[test]
    fn builds_station_from_file() {
        let dir = TempDir::new().expect("tempdir");
        let file = StationFile::load(&write(&dir, CELL)).expect("parse");

        let (station, devices) = file.build().expect("build");

        assert_eq!(station.name(), "Cell");
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].script, Some(dir.path().join("gripper.lua")));
        assert_eq!(devices[1].script, None);
        assert_eq!(devices[0].device.signal_value("Closed"), Some(1.0));
        assert!(station.find_object("Table").is_some_and(|o| !o.supports_connections));
        assert!(station.connections()[0].allow_cycle);
    }

    #[test]
    fn unknown_signal_kind_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let content = r#"
name = "Cell"
[[device]]
name = "Gripper"
signals = [{ name = "X", kind = "Pneumatic" }]
"#;
        let file = StationFile::load(&write(&dir, content)).expect("parse");

        let err = file.build().expect_err("bad kind");
        assert!(matches!(err, StationFileError::SignalKind { .. }));
        assert!(err.to_string().contains("Pneumatic"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let content = r#"
name = "Cell"
[[device]]
name = "A"
[[part]]
name = "A"
"#;
        let file = StationFile::load(&write(&dir, content)).expect("parse");
        assert!(matches!(
            file.build(),
            Err(StationFileError::DuplicateObject(name)) if name == "A"
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StationFile::load(Path::new("/no/such/station.toml")).expect_err("missing");
        assert!(err.to_string().contains("/no/such/station.toml"));
    }
}
