use crate::error::Error;
use log::warn;
use std::sync::Mutex;
use uuid::Uuid;

/// Non-fatal problems found while reading the incident set.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A timestamp could not be read; the incident is left out of layout and snapping.
    InvalidTimestamp {
        camera_id: Uuid,
        incident_id: Uuid,
        error: Error,
    },
    /// `end < start`; rendered at minimum width and never snapped to.
    MalformedIncident {
        camera_id: Uuid,
        incident_id: Uuid,
        error: Error,
    },
}

impl Diagnostic {
    pub fn incident_id(&self) -> Uuid {
        match self {
            Self::InvalidTimestamp { incident_id, .. } | Self::MalformedIncident { incident_id, .. } => {
                *incident_id
            }
        }
    }

    pub fn camera_id(&self) -> Uuid {
        match self {
            Self::InvalidTimestamp { camera_id, .. } | Self::MalformedIncident { camera_id, .. } => {
                *camera_id
            }
        }
    }

    pub fn error(&self) -> &Error {
        match self {
            Self::InvalidTimestamp { error, .. } | Self::MalformedIncident { error, .. } => error,
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: writes each diagnostic to the log at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(
            "Incident {} on camera {}: {}",
            diagnostic.incident_id(),
            diagnostic.camera_id(),
            diagnostic.error()
        );
    }
}

/// Collects diagnostics in memory, e.g. to return them alongside a layout.
impl DiagnosticSink for Mutex<Vec<Diagnostic>> {
    fn report(&self, diagnostic: Diagnostic) {
        match self.lock() {
            Ok(mut diagnostics) => diagnostics.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
