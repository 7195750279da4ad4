//! Typed I/O signals and the per-device signal store.
//!
//! # Value Coercion
//!
//! | Kind | Stored value |
//! |------|--------------|
//! | `DigitalInput`, `DigitalOutput` | `1.0` if nonzero, else `0.0` |
//! | `DigitalGroupInput`, `DigitalGroupOutput` | truncated toward zero |
//! | `AnalogInput`, `AnalogOutput` | unchanged |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the reserved control signal every device carries.
///
/// Raising it to `1` asks the host to pick a new script file.
/// It survives `clear_signals` and is never routed to scripts.
pub const CONTROL_SIGNAL: &str = "LoadFile";

/// Error returned by strict [`SignalKind`] parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal kind: {0}")]
pub struct SignalKindError(pub String);

/// The kind of an I/O signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    AnalogInput,
    AnalogOutput,
    DigitalGroupInput,
    DigitalGroupOutput,
    DigitalInput,
    DigitalOutput,
}

impl SignalKind {
    /// All kinds, in vocabulary order.
    pub const ALL: [SignalKind; 6] = [
        Self::AnalogInput,
        Self::AnalogOutput,
        Self::DigitalGroupInput,
        Self::DigitalGroupOutput,
        Self::DigitalInput,
        Self::DigitalOutput,
    ];

    /// Returns the script-facing name (`"digitalinput"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnalogInput => "analoginput",
            Self::AnalogOutput => "analogoutput",
            Self::DigitalGroupInput => "digitalgroupinput",
            Self::DigitalGroupOutput => "digitalgroupoutput",
            Self::DigitalInput => "digitalinput",
            Self::DigitalOutput => "digitaloutput",
        }
    }

    /// Parses a kind name case-insensitively, falling back to `DigitalInput`.
    ///
    /// ```
    /// use rslua_station::SignalKind;
    ///
    /// assert_eq!(SignalKind::parse_lenient("AnalogOutput"), SignalKind::AnalogOutput);
    /// assert_eq!(SignalKind::parse_lenient("bogus"), SignalKind::DigitalInput);
    /// ```
    #[must_use]
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or(Self::DigitalInput)
    }

    /// Returns `true` for kinds driven from outside the device.
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(
            self,
            Self::AnalogInput | Self::DigitalGroupInput | Self::DigitalInput
        )
    }

    /// Coerces a raw value into the domain of this kind.
    #[must_use]
    pub fn coerce(self, value: f64) -> f64 {
        match self {
            Self::DigitalInput | Self::DigitalOutput => {
                if value != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::DigitalGroupInput | Self::DigitalGroupOutput => value.trunc(),
            Self::AnalogInput | Self::AnalogOutput => value,
        }
    }
}

impl FromStr for SignalKind {
    type Err = SignalKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| SignalKindError(s.to_string()))
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed, valued I/O point on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub kind: SignalKind,
    pub value: f64,
    /// Read-only from the host UI side.
    pub read_only: bool,
}

impl Signal {
    /// Creates a writable signal with value `0`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: 0.0,
            read_only: false,
        }
    }

    /// Marks the signal read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Ordered collection of signals with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStore {
    signals: Vec<Signal>,
}

impl SignalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.signals.iter().any(|s| s.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Adds a signal. Returns `false` (and leaves the store untouched)
    /// if a signal with the same name already exists.
    pub fn add(&mut self, signal: Signal) -> bool {
        if self.contains(&signal.name) {
            return false;
        }
        self.signals.push(signal);
        true
    }

    /// Removes every signal not accepted by `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Signal) -> bool) {
        self.signals.retain(keep);
    }

    /// Writes a value, coerced by the signal's kind.
    ///
    /// Returns the stored value, or `None` if the signal does not exist.
    pub fn set_value(&mut self, name: &str, value: f64) -> Option<f64> {
        let signal = self.signals.iter_mut().find(|s| s.name == name)?;
        signal.value = signal.kind.coerce(value);
        Some(signal.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_case_insensitive() {
        assert_eq!(
            "DigitalGroupOutput".parse::<SignalKind>(),
            Ok(SignalKind::DigitalGroupOutput)
        );
        assert_eq!("ANALOGINPUT".parse::<SignalKind>(), Ok(SignalKind::AnalogInput));
        assert!("digital".parse::<SignalKind>().is_err());
    }

    #[test]
    fn digital_kinds_clamp_to_bit() {
        assert_eq!(SignalKind::DigitalOutput.coerce(5.0), 1.0);
        assert_eq!(SignalKind::DigitalOutput.coerce(0.0), 0.0);
        assert_eq!(SignalKind::DigitalInput.coerce(-0.2), 1.0);
    }

    #[test]
    fn group_kinds_truncate() {
        assert_eq!(SignalKind::DigitalGroupInput.coerce(3.7), 3.0);
        assert_eq!(SignalKind::DigitalGroupOutput.coerce(-2.9), -2.0);
    }

    #[test]
    fn analog_kinds_pass_through() {
        assert_eq!(SignalKind::AnalogOutput.coerce(3.25), 3.25);
    }

    #[test]
    fn store_rejects_duplicates() {
        let mut store = SignalStore::new();
        assert!(store.add(Signal::new("X", SignalKind::DigitalInput)));
        assert!(!store.add(Signal::new("X", SignalKind::AnalogInput)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("X").map(|s| s.kind), Some(SignalKind::DigitalInput));
    }

    #[test]
    fn set_value_on_missing_signal() {
        let mut store = SignalStore::new();
        assert_eq!(store.set_value("nope", 1.0), None);
    }
}
