use crate::error::Error;
use crate::store::models::{CameraRecord, CameraSummary, IncidentRecord, IncidentWithCamera};
use crate::store::IncidentStore;
use anyhow::Result;
use log::info;
use uuid::Uuid;

/// Incidents repository for handling incident operations
#[derive(Clone)]
pub struct IncidentsRepository {
    store: IncidentStore,
}

impl IncidentsRepository {
    /// Create a new incidents repository
    pub fn new(store: IncidentStore) -> Self {
        Self { store }
    }

    /// Create a new incident on an existing camera
    pub async fn create(&self, incident: &IncidentRecord) -> Result<IncidentRecord> {
        let mut data = self.store.data.write().await;

        if !data.cameras.iter().any(|c| c.id == incident.camera_id) {
            return Err(Error::NotFound(format!("Camera {}", incident.camera_id)).into());
        }
        if data.incidents.iter().any(|i| i.id == incident.id) {
            return Err(Error::AlreadyExists(format!("Incident {}", incident.id)).into());
        }

        data.incidents.push(incident.clone());
        Ok(incident.clone())
    }

    /// Get incident by ID
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<IncidentRecord>> {
        let data = self.store.data.read().await;
        Ok(data.incidents.iter().find(|i| i.id == *id).cloned())
    }

    /// Get incidents for a camera in insertion order
    pub async fn get_by_camera(&self, camera_id: &Uuid) -> Result<Vec<IncidentRecord>> {
        let data = self.store.data.read().await;
        Ok(data
            .incidents
            .iter()
            .filter(|i| i.camera_id == *camera_id)
            .cloned()
            .collect())
    }

    /// List incidents newest first, optionally filtered by resolved status
    pub async fn list(&self, resolved: Option<bool>) -> Result<Vec<IncidentWithCamera>> {
        let data = self.store.data.read().await;

        let mut incidents: Vec<IncidentWithCamera> = data
            .incidents
            .iter()
            .filter(|i| resolved.map_or(true, |r| i.resolved == r))
            .filter_map(|i| {
                join_camera(&data.cameras, i).map(|camera| IncidentWithCamera::new(i.clone(), camera))
            })
            .collect();

        incidents.sort_by(|a, b| b.incident.ts_start.cmp(&a.incident.ts_start));
        Ok(incidents)
    }

    /// Flip an incident between resolved and unresolved
    pub async fn toggle_resolved(&self, id: &Uuid) -> Result<IncidentWithCamera> {
        let mut data = self.store.data.write().await;

        let incident = data
            .incidents
            .iter_mut()
            .find(|i| i.id == *id)
            .ok_or_else(|| Error::NotFound(format!("Incident {}", id)))?;
        incident.resolved = !incident.resolved;
        let incident = incident.clone();

        let camera = join_camera(&data.cameras, &incident)
            .ok_or_else(|| Error::NotFound(format!("Camera {}", incident.camera_id)))?;

        info!(
            "Incident {} on {} ({}) is now {}",
            id,
            camera.name,
            camera.location,
            if incident.resolved { "resolved" } else { "unresolved" }
        );
        Ok(IncidentWithCamera::new(incident, camera))
    }
}

fn join_camera(cameras: &[CameraRecord], incident: &IncidentRecord) -> Option<CameraSummary> {
    cameras
        .iter()
        .find(|c| c.id == incident.camera_id)
        .map(CameraRecord::summary)
}
