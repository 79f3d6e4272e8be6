pub mod camera_models;
pub mod incident_models;

pub use camera_models::{CameraRecord, CameraSummary};
pub use incident_models::{IncidentRecord, IncidentWithCamera};
