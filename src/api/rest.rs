use crate::config::{ApiConfig, TimelineConfig};
use crate::error::Error;
use crate::messaging::{EventBus, EventType};
use crate::store::models::{CameraRecord, IncidentWithCamera};
use crate::store::repositories::{CamerasRepository, IncidentsRepository};
use crate::store::IncidentStore;
use crate::timeline::{Camera, TimelineScene, TimelineView};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use uuid::Uuid;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cameras: CamerasRepository,
    pub incidents: IncidentsRepository,
    pub events: EventBus,
    pub timeline: Arc<TimelineConfig>,
}

impl AppState {
    pub fn new(store: IncidentStore, events: EventBus, timeline: TimelineConfig) -> Self {
        Self {
            cameras: CamerasRepository::new(store.clone()),
            incidents: IncidentsRepository::new(store),
            events,
            timeline: Arc::new(timeline),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::Config(_) | Error::InvalidScale(_) | Error::InvalidTimestamp { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiError {
            message: err.to_string(),
            status: status.as_u16(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<Error>() {
            return err.clone().into();
        }

        ApiError {
            message: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(self);
        (status, body).into_response()
    }
}

pub struct RestApi {
    config: ApiConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(config: &ApiConfig, state: AppState) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            state,
        })
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(false)
            .max_age(Duration::from_secs(3600));

        Router::new()
            .route("/api/cameras", get(get_cameras))
            .route("/api/cameras/:id", get(get_camera_by_id))
            .route("/api/incidents", get(get_incidents))
            .route("/api/incidents/:id/resolve", patch(resolve_incident))
            .route("/api/timeline", get(get_timeline))
            .with_state(self.state.clone())
            // Dashboard assets, category icons and thumbnails
            .nest_service("/", ServeDir::new(&self.config.static_dir))
            .layer(cors)
    }

    pub async fn run(&self) -> Result<()> {
        let app = self.router();

        let addr = self.config.address.clone() + ":" + &self.config.port.to_string();
        let addr: SocketAddr = addr.parse()?;

        info!("API server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::Server::from_tcp(listener.into_std()?)?
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}

/// Cameras carrying at least one unresolved incident: the timeline's input.
async fn get_cameras(State(state): State<AppState>) -> ApiResult<Json<Vec<Camera>>> {
    let cameras = state.cameras.get_with_unresolved_incidents().await?;
    Ok(Json(cameras))
}

async fn get_camera_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CameraRecord>> {
    let camera = state
        .cameras
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Camera {}", id)))?;

    Ok(Json(camera))
}

#[derive(Debug, Default, Deserialize)]
pub struct IncidentQuery {
    pub resolved: Option<bool>,
}

async fn get_incidents(
    State(state): State<AppState>,
    Query(query): Query<IncidentQuery>,
) -> ApiResult<Json<Vec<IncidentWithCamera>>> {
    let incidents = state.incidents.list(query.resolved).await?;
    Ok(Json(incidents))
}

/// Toggle the resolved flag; a second call reopens the incident.
async fn resolve_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IncidentWithCamera>> {
    let toggled = state.incidents.toggle_resolved(&id).await?;

    let event_type = if toggled.incident.resolved {
        EventType::IncidentResolved
    } else {
        EventType::IncidentReopened
    };
    if let Err(e) = state.events.publish(event_type.clone(), Some(id), &toggled) {
        warn!("Failed to publish {} event: {}", event_type, e);
    }

    Ok(Json(toggled))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    pub pixels_per_minute: Option<f64>,
    pub cursor_minutes: Option<f64>,
}

async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> ApiResult<Json<TimelineScene>> {
    let mut view = TimelineView::new(state.timeline.view_config()?, Arc::new(state.events.clone()));
    if let Some(pixels_per_minute) = query.pixels_per_minute {
        view.set_pixels_per_minute(pixels_per_minute)?;
    }

    let count = view.reload(&state.cameras).await?;
    if let Err(e) = state
        .events
        .publish(EventType::CamerasReloaded, None, serde_json::json!({ "cameras": count }))
    {
        warn!("Failed to publish cameras reloaded event: {}", e);
    }

    if let Some(minutes) = query.cursor_minutes {
        view.seek(minutes);
    }

    Ok(Json(view.scene()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::EventMessage;
    use crate::store::models::IncidentRecord;
    use crate::timeline::IncidentCategory;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    async fn fixture() -> anyhow::Result<(AppState, Vec<IncidentRecord>)> {
        let state = AppState::new(IncidentStore::new(), EventBus::new(), TimelineConfig::default());

        let gate = state.cameras.create(&CameraRecord::new("Camera C", "Main Gate")).await?;
        let floor = state.cameras.create(&CameraRecord::new("Camera A", "Shop Floor")).await?;

        let start = Utc.with_ymd_and_hms(2025, 7, 11, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 11, 9, 5, 0).unwrap();
        let mut incidents = Vec::new();
        for camera in [&gate, &floor] {
            let incident = IncidentRecord::new(camera.id, IncidentCategory::UnauthorizedAccess, start, end);
            incidents.push(state.incidents.create(&incident).await?);
        }

        Ok((state, incidents))
    }

    #[tokio::test]
    async fn test_resolve_publishes_event() -> anyhow::Result<()> {
        let (state, incidents) = fixture().await?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state.events.subscribe_all(Arc::new(move |event: EventMessage| -> anyhow::Result<()> {
            sink.lock().unwrap().push((event.event_type, event.source_id));
            Ok(())
        }));

        let Json(resolved) = resolve_incident(State(state.clone()), Path(incidents[0].id))
            .await
            .unwrap();
        assert!(resolved.incident.resolved);
        assert_eq!(resolved.camera.location, "Main Gate");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(EventType::IncidentResolved, Some(incidents[0].id))]
        );

        let Json(cameras) = get_cameras(State(state)).await.unwrap();
        assert_eq!(cameras.len(), 1);
        assert_eq!(cameras[0].camera_name, "Camera A");
        Ok(())
    }

    #[tokio::test]
    async fn test_second_resolve_reopens_incident() -> anyhow::Result<()> {
        let (state, incidents) = fixture().await?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state.events.subscribe(
            EventType::IncidentReopened,
            Arc::new(move |event: EventMessage| -> anyhow::Result<()> {
                sink.lock().unwrap().push(event.source_id);
                Ok(())
            }),
        );

        resolve_incident(State(state.clone()), Path(incidents[0].id)).await.unwrap();
        let Json(reopened) = resolve_incident(State(state.clone()), Path(incidents[0].id))
            .await
            .unwrap();
        assert!(!reopened.incident.resolved);
        assert_eq!(*seen.lock().unwrap(), vec![Some(incidents[0].id)]);

        let Json(cameras) = get_cameras(State(state)).await.unwrap();
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].camera_name, "Camera C");
        assert_eq!(cameras[0].incidents[0].id, incidents[0].id);
        Ok(())
    }

    #[tokio::test]
    async fn test_camera_by_id() -> anyhow::Result<()> {
        let (state, incidents) = fixture().await?;

        let Json(camera) = get_camera_by_id(State(state.clone()), Path(incidents[1].camera_id))
            .await
            .unwrap();
        assert_eq!(camera.name, "Camera A");
        assert_eq!(camera.location, "Shop Floor");

        let err = get_camera_by_id(State(state), Path(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status, 404);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_not_found() -> anyhow::Result<()> {
        let (state, _) = fixture().await?;
        let err = resolve_incident(State(state), Path(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status, 404);
        Ok(())
    }

    #[tokio::test]
    async fn test_incident_filter() -> anyhow::Result<()> {
        let (state, incidents) = fixture().await?;
        state.incidents.toggle_resolved(&incidents[1].id).await?;

        let Json(open) = get_incidents(
            State(state.clone()),
            Query(IncidentQuery { resolved: Some(false) }),
        )
        .await
        .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].incident.id, incidents[0].id);

        let Json(all) = get_incidents(State(state), Query(IncidentQuery::default())).await.unwrap();
        assert_eq!(all.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_timeline_scene() -> anyhow::Result<()> {
        let (state, _) = fixture().await?;

        let Json(scene) = get_timeline(
            State(state),
            Query(TimelineQuery {
                pixels_per_minute: None,
                cursor_minutes: Some(545.0),
            }),
        )
        .await
        .unwrap();

        assert_eq!(scene.rows.len(), 2);
        assert_eq!(scene.rows[0].bars[0].x, 540.0 * 5.0 + 140.0);
        assert_eq!(scene.rows[0].bars[0].width, 25.0);
        assert_eq!(scene.width, 1440.0 * 5.0 + 140.0 + 20.0);
        assert_eq!(scene.height, 2.0 * 35.0 + 55.0);
        assert_eq!(scene.scrubber.cursor_minutes, 545.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_timeline_rejects_bad_scale() -> anyhow::Result<()> {
        let (state, _) = fixture().await?;
        let err = get_timeline(
            State(state),
            Query(TimelineQuery {
                pixels_per_minute: Some(-1.0),
                cursor_minutes: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, 400);
        Ok(())
    }

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = anyhow::Error::from(Error::AlreadyExists("Camera".into())).into();
        assert_eq!(err.status, 409);
        let err: ApiError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status, 500);
    }
}
