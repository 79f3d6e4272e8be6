use crate::error::Error;
use crate::store::models::CameraRecord;
use crate::store::IncidentStore;
use crate::timeline::model::Camera;
use crate::timeline::view::CameraSource;
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use uuid::Uuid;

/// Cameras repository for handling camera operations
#[derive(Clone)]
pub struct CamerasRepository {
    store: IncidentStore,
}

impl CamerasRepository {
    /// Create a new cameras repository
    pub fn new(store: IncidentStore) -> Self {
        Self { store }
    }

    /// Create a new camera
    pub async fn create(&self, camera: &CameraRecord) -> Result<CameraRecord> {
        info!("Creating new camera: {}", camera.name);

        let mut data = self.store.data.write().await;
        if data.cameras.iter().any(|c| c.id == camera.id) {
            return Err(Error::AlreadyExists(format!("Camera {}", camera.id)).into());
        }
        data.cameras.push(camera.clone());

        Ok(camera.clone())
    }

    /// Get camera by ID
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<CameraRecord>> {
        let data = self.store.data.read().await;
        Ok(data.cameras.iter().find(|c| c.id == *id).cloned())
    }

    /// Cameras that have at least one unresolved incident, each carrying those
    /// incidents in insertion order
    pub async fn get_with_unresolved_incidents(&self) -> Result<Vec<Camera>> {
        let data = self.store.data.read().await;

        let cameras: Vec<Camera> = data
            .cameras
            .iter()
            .map(|camera| Camera {
                camera_id: camera.id,
                camera_name: camera.name.clone(),
                location: camera.location.clone(),
                incidents: data
                    .incidents
                    .iter()
                    .filter(|i| i.camera_id == camera.id && !i.resolved)
                    .map(|i| i.to_timeline())
                    .collect(),
            })
            .filter(|camera| !camera.incidents.is_empty())
            .collect();

        debug!("{} cameras with unresolved incidents", cameras.len());
        Ok(cameras)
    }
}

#[async_trait]
impl CameraSource for CamerasRepository {
    async fn fetch_cameras(&self) -> Result<Vec<Camera>> {
        self.get_with_unresolved_incidents().await
    }
}
