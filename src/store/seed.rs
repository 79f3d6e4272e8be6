//! Startup data for the incident store: a JSON seed file or generated demo data.

use super::models::{CameraRecord, IncidentRecord};
use crate::error::Error;
use crate::timeline::model::IncidentCategory;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default)]
pub struct Seed {
    pub cameras: Vec<CameraRecord>,
    pub incidents: Vec<IncidentRecord>,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    cameras: Vec<SeedCamera>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedCamera {
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    incidents: Vec<SeedIncident>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedIncident {
    #[serde(rename = "type", alias = "category")]
    category: IncidentCategory,
    ts_start: DateTime<Utc>,
    ts_end: DateTime<Utc>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    resolved: bool,
}

pub fn parse_seed(contents: &str) -> Result<Seed> {
    let file: SeedFile = serde_json::from_str(contents).map_err(Error::from)?;
    let mut seed = Seed::default();

    for camera in file.cameras {
        let record = CameraRecord::new(camera.name, camera.location);
        for incident in camera.incidents {
            let mut incident_record =
                IncidentRecord::new(record.id, incident.category, incident.ts_start, incident.ts_end);
            incident_record.thumbnail_url = incident.thumbnail_url;
            incident_record.resolved = incident.resolved;
            seed.incidents.push(incident_record);
        }
        seed.cameras.push(record);
    }

    Ok(seed)
}

pub fn load_seed_file(path: &Path) -> Result<Seed> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read seed file: {:?}", path))?;
    parse_seed(&contents).context(format!("Failed to parse seed file: {:?}", path))
}

/// Three cameras and twelve five-minute incidents spread over the last day,
/// every two hours starting 24 hours before `now`.
pub fn demo_seed<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Seed {
    let cameras = vec![
        CameraRecord::new("Camera A", "Shop Floor"),
        CameraRecord::new("Camera B", "Basement Level 2"),
        CameraRecord::new("Camera C", "Main Gate"),
    ];

    let incidents = (0..12)
        .map(|i| {
            let camera = &cameras[i % cameras.len()];
            let category = IncidentCategory::KNOWN[i % IncidentCategory::KNOWN.len()].clone();
            let ts_start = now - Duration::hours(24 - 2 * i as i64);
            let ts_end = ts_start + Duration::minutes(5);

            let mut incident = IncidentRecord::new(camera.id, category, ts_start, ts_end);
            incident.thumbnail_url = Some(format!("/thumbnails/thumb{}.jpg", (i % 5) + 1));
            incident.resolved = rng.gen_bool(0.5);
            incident
        })
        .collect();

    Seed { cameras, incidents }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_demo_seed_shape() {
        let now = Utc.with_ymd_and_hms(2025, 7, 11, 12, 0, 0).unwrap();
        let seed = demo_seed(now, &mut StdRng::seed_from_u64(7));

        assert_eq!(seed.cameras.len(), 3);
        assert_eq!(seed.incidents.len(), 12);
        assert_eq!(seed.incidents[0].ts_start, now - Duration::hours(24));
        assert_eq!(seed.incidents[11].ts_start, now - Duration::hours(2));
        assert_eq!(seed.incidents[4].camera_id, seed.cameras[1].id);
        assert_eq!(seed.incidents[5].category, IncidentCategory::FaceRecognized);
        assert_eq!(seed.incidents[6].thumbnail_url.as_deref(), Some("/thumbnails/thumb2.jpg"));
        for incident in &seed.incidents {
            assert_eq!(incident.ts_end - incident.ts_start, Duration::minutes(5));
        }
    }

    #[test]
    fn test_parse_seed_file() {
        let seed = parse_seed(
            r#"{"cameras": [
                {"name": "Lobby", "location": "Ground Floor", "incidents": [
                    {"type": "Gun Threat", "tsStart": "2025-07-11T08:00:00Z", "tsEnd": "2025-07-11T08:05:00Z"},
                    {"type": "Face Recognised", "tsStart": "2025-07-11T09:00:00Z", "tsEnd": "2025-07-11T09:00:00Z", "resolved": true}
                ]},
                {"name": "Dock"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(seed.cameras.len(), 2);
        assert_eq!(seed.incidents.len(), 2);
        assert!(seed.incidents.iter().all(|i| i.camera_id == seed.cameras[0].id));
        assert!(seed.incidents[1].resolved);
        assert_eq!(seed.cameras[1].location, "");
    }

    #[test]
    fn test_parse_seed_rejects_bad_json() {
        assert!(parse_seed("{\"cameras\": [{}]}").is_err());
    }
}
