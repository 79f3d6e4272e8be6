pub mod api;
pub mod config;
pub mod error;
pub mod messaging;
pub mod store;
pub mod timeline;
pub mod utils;

pub use error::Error;

// Re-export main components for easier use
pub use timeline::{
    Camera,
    CameraSource,
    Incident,
    IncidentCategory,
    ScrubberController,
    TimeScale,
    TimelineView,
};
