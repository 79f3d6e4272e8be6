use crate::config::StoreConfig;
use anyhow::Result;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod models;
pub mod repositories;
pub mod seed;

use models::{CameraRecord, IncidentRecord};

/// Rows held by the store, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct StoreData {
    pub(crate) cameras: Vec<CameraRecord>,
    pub(crate) incidents: Vec<IncidentRecord>,
}

/// Shared in-memory camera/incident store.
///
/// Cloning is cheap; every clone sees the same data. Repositories wrap a clone
/// the way they would wrap a connection pool.
#[derive(Debug, Clone, Default)]
pub struct IncidentStore {
    pub(crate) data: Arc<RwLock<StoreData>>,
}

impl IncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store according to configuration: a seed file if one is set,
    /// otherwise optional demo data.
    pub async fn initialize(config: &StoreConfig) -> Result<Self> {
        let store = Self::new();

        if let Some(path) = &config.seed_path {
            let seed = seed::load_seed_file(path)?;
            store.insert(seed.cameras, seed.incidents).await;
        } else if config.seed_demo_data {
            let seed = seed::demo_seed(chrono::Utc::now(), &mut rand::thread_rng());
            store.insert(seed.cameras, seed.incidents).await;
        }

        let (cameras, incidents) = store.counts().await;
        info!("Incident store ready with {} cameras and {} incidents", cameras, incidents);
        Ok(store)
    }

    pub async fn counts(&self) -> (usize, usize) {
        let data = self.data.read().await;
        (data.cameras.len(), data.incidents.len())
    }

    async fn insert(&self, cameras: Vec<CameraRecord>, incidents: Vec<IncidentRecord>) {
        let mut data = self.data.write().await;
        data.cameras.extend(cameras);
        data.incidents.extend(incidents);
    }
}
