use super::coordinate::parse_timestamp;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Incident categories reported by the detection pipeline.
///
/// Unknown labels are preserved in `Other` so a new detector type never breaks
/// layout; it simply renders with the neutral style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncidentCategory {
    UnauthorizedAccess,
    GunThreat,
    FaceRecognized,
    Other(String),
}

impl IncidentCategory {
    pub const KNOWN: [IncidentCategory; 3] = [
        IncidentCategory::UnauthorizedAccess,
        IncidentCategory::GunThreat,
        IncidentCategory::FaceRecognized,
    ];

    pub fn style(&self) -> CategoryStyle {
        match self {
            Self::UnauthorizedAccess => CategoryStyle::UnauthorizedAccess,
            Self::GunThreat => CategoryStyle::GunThreat,
            Self::FaceRecognized => CategoryStyle::FaceRecognized,
            Self::Other(_) => CategoryStyle::Neutral,
        }
    }
}

impl From<String> for IncidentCategory {
    fn from(label: String) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "unauthorizedaccess" => Self::UnauthorizedAccess,
            "gunthreat" => Self::GunThreat,
            "facerecognised" | "facerecognized" => Self::FaceRecognized,
            _ => Self::Other(label),
        }
    }
}

impl From<&str> for IncidentCategory {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<IncidentCategory> for String {
    fn from(category: IncidentCategory) -> Self {
        category.to_string()
    }
}

impl Display for IncidentCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnauthorizedAccess => write!(f, "Unauthorized Access"),
            Self::GunThreat => write!(f, "Gun Threat"),
            Self::FaceRecognized => write!(f, "Face Recognised"),
            Self::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Color/icon key a bar is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStyle {
    UnauthorizedAccess,
    GunThreat,
    FaceRecognized,
    Neutral,
}

impl CategoryStyle {
    pub fn color(&self) -> &'static str {
        match self {
            Self::UnauthorizedAccess => "#431407",
            Self::GunThreat => "#450A0A",
            Self::FaceRecognized => "#172554",
            Self::Neutral => "#6B7280",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::UnauthorizedAccess => "/icons/door.svg",
            Self::GunThreat => "/icons/alert.svg",
            Self::FaceRecognized => "/icons/people.svg",
            Self::Neutral => "/icons/unknown.svg",
        }
    }
}

/// One incident as delivered by the camera/incident collaborator.
///
/// Timestamps stay as the raw ISO-8601 text; the engine parses them and reports
/// records it cannot read instead of rejecting the whole camera list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Uuid,
    #[serde(rename = "type", alias = "category")]
    pub category: IncidentCategory,
    #[serde(alias = "startTimestamp")]
    pub ts_start: String,
    #[serde(alias = "endTimestamp")]
    pub ts_end: String,
}

impl Incident {
    /// Both bounds on the reference clock. Fails on the first unreadable timestamp.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((parse_timestamp(&self.ts_start)?, parse_timestamp(&self.ts_end)?))
    }

    pub(crate) fn malformed_error(&self) -> Error {
        Error::MalformedIncident {
            incident_id: self.id.to_string(),
            reason: format!("ends at {} before it starts at {}", self.ts_end, self.ts_start),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub camera_id: Uuid,
    pub camera_name: String,
    #[serde(default)]
    pub location: String,
    /// Arrival order from the collaborator; not necessarily time-sorted.
    #[serde(default)]
    pub incidents: Vec<Incident>,
}
