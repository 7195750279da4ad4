//! Host services shared by the registry, sessions and bridge functions.

use rslua_station::{HostLog, Severity, SimulationClock};
use std::sync::Arc;

/// The host-side collaborators every part of the bridge reports to.
///
/// User-facing messages are mirrored to `tracing` and written to the host
/// log with the configured prefix, so that the host's refresh hook can
/// recognise (and ignore) them.
#[derive(Clone)]
pub struct HostServices {
    log: Arc<dyn HostLog>,
    clock: Arc<dyn SimulationClock>,
    prefix: String,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl HostServices {
    #[must_use]
    pub fn new(
        log: Arc<dyn HostLog>,
        clock: Arc<dyn SimulationClock>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            log,
            clock,
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn clock(&self) -> &dyn SimulationClock {
        self.clock.as_ref()
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn info(&self, text: impl AsRef<str>) {
        self.report(Severity::Information, text.as_ref());
    }

    pub fn warn(&self, text: impl AsRef<str>) {
        self.report(Severity::Warning, text.as_ref());
    }

    pub fn error(&self, text: impl AsRef<str>) {
        self.report(Severity::Error, text.as_ref());
    }

    fn report(&self, severity: Severity, text: &str) {
        match severity {
            Severity::Information => tracing::info!("{text}"),
            Severity::Warning => tracing::warn!("{text}"),
            Severity::Error => tracing::error!("{text}"),
        }
        self.log
            .add_message(severity, &format!("{}: {text}", self.prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rslua_station::{ManualClock, MemoryLog};

    #[test]
    fn messages_carry_prefix_and_severity() {
        let log = Arc::new(MemoryLog::new());
        let host = HostServices::new(log.clone(), Arc::new(ManualClock::new()), "Cell");

        host.warn("careful");

        let messages = log.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Warning);
        assert_eq!(messages[0].text, "Cell: careful");
    }
}
