pub mod coordinate;
pub mod diagnostics;
pub mod layout;
pub mod model;
pub mod ruler;
pub mod scrubber;
pub mod view;

pub use coordinate::{format_clock, format_clock_with_seconds, TimeScale, MINUTES_PER_DAY};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogDiagnostics};
pub use layout::{layout, layout_with_diagnostics, BarGeometry, CameraRow, LayoutConfig};
pub use model::{Camera, CategoryStyle, Incident, IncidentCategory};
pub use scrubber::{ScrubberConfig, ScrubberController, ScrubberState, ScrubberUpdate, SnapPolicy};
pub use view::{CameraSource, TimelineScene, TimelineView, ViewConfig};
