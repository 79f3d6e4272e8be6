use super::camera_models::CameraSummary;
use crate::timeline::model::{Incident, IncidentCategory};
use crate::utils::format_range;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incident model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub id: Uuid,
    pub camera_id: Uuid,
    #[serde(rename = "type")]
    pub category: IncidentCategory,
    pub ts_start: DateTime<Utc>,
    pub ts_end: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub resolved: bool,
}

impl IncidentRecord {
    pub fn new(
        camera_id: Uuid,
        category: IncidentCategory,
        ts_start: DateTime<Utc>,
        ts_end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            camera_id,
            category,
            ts_start,
            ts_end,
            thumbnail_url: None,
            resolved: false,
        }
    }

    /// The record as the timeline consumes it.
    pub fn to_timeline(&self) -> Incident {
        Incident {
            id: self.id,
            category: self.category.clone(),
            ts_start: self.ts_start.to_rfc3339_opts(SecondsFormat::Millis, true),
            ts_end: self.ts_end.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Incident joined with its camera, as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentWithCamera {
    #[serde(flatten)]
    pub incident: IncidentRecord,
    pub camera: CameraSummary,
    /// e.g. `08:00:00 - 08:05:00 on 11-July-2025`
    pub time_range: String,
}

impl IncidentWithCamera {
    pub fn new(incident: IncidentRecord, camera: CameraSummary) -> Self {
        let time_range = format_range(&incident.ts_start, &incident.ts_end);
        Self {
            incident,
            camera,
            time_range,
        }
    }
}
