use super::coordinate::{day_minutes, TimeScale};
use super::diagnostics::{Diagnostic, DiagnosticSink, LogDiagnostics};
use super::model::{Camera, CategoryStyle, Incident, IncidentCategory};
use log::trace;
use serde::Serialize;
use uuid::Uuid;

/// Vertical gap between a row's top edge and its bars.
const BAR_INSET: f64 = 5.0;

/// Geometry constants for [`layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub scale: TimeScale,
    /// Floor applied to every bar width so zero-length incidents stay clickable.
    pub minimum_bar_width: f64,
    /// Distance between the tops of consecutive camera rows.
    pub row_height: f64,
    /// Space above the first row (title and ruler).
    pub header_height: f64,
    /// Height of a row's background track.
    pub bar_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGeometry {
    pub incident_id: Uuid,
    pub row: usize,
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub category: IncidentCategory,
    pub style: CategoryStyle,
    /// Set when the incident ends before it starts.
    pub malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRow {
    pub index: usize,
    pub camera_id: Uuid,
    pub label: String,
    pub location: String,
    pub y: f64,
    pub height: f64,
    /// Bars in incident arrival order; overlapping bars are left superimposed.
    pub bars: Vec<BarGeometry>,
}

/// Lay out every camera as a row and every incident as a bar, reporting
/// unreadable records to the log.
pub fn layout(cameras: &[Camera], config: &LayoutConfig) -> Vec<CameraRow> {
    layout_with_diagnostics(cameras, config, &LogDiagnostics)
}

pub fn layout_with_diagnostics(
    cameras: &[Camera],
    config: &LayoutConfig,
    sink: &dyn DiagnosticSink,
) -> Vec<CameraRow> {
    cameras
        .iter()
        .enumerate()
        .map(|(index, camera)| {
            let y = config.header_height + index as f64 * config.row_height;
            let bars = camera
                .incidents
                .iter()
                .filter_map(|incident| place_bar(camera, incident, index, y, config, sink))
                .collect();

            CameraRow {
                index,
                camera_id: camera.camera_id,
                label: camera.camera_name.clone(),
                location: camera.location.clone(),
                y,
                height: config.bar_height,
                bars,
            }
        })
        .collect()
}

fn place_bar(
    camera: &Camera,
    incident: &Incident,
    row: usize,
    row_y: f64,
    config: &LayoutConfig,
    sink: &dyn DiagnosticSink,
) -> Option<BarGeometry> {
    let (start, end) = match incident.bounds() {
        Ok(bounds) => bounds,
        Err(error) => {
            sink.report(Diagnostic::InvalidTimestamp {
                camera_id: camera.camera_id,
                incident_id: incident.id,
                error,
            });
            return None;
        }
    };

    let malformed = end < start;
    if malformed {
        sink.report(Diagnostic::MalformedIncident {
            camera_id: camera.camera_id,
            incident_id: incident.id,
            error: incident.malformed_error(),
        });
    }

    let window = config.scale.day_window_minutes();
    let start_minutes = day_minutes(&start);
    if start_minutes >= window {
        trace!("Incident {} starts after the window closes", incident.id);
        return None;
    }

    let end_minutes = if malformed {
        start_minutes
    } else if end.date_naive() > start.date_naive() {
        // Runs past midnight: clip at the end of the window.
        window
    } else {
        day_minutes(&end).min(window)
    };

    let duration = end_minutes.saturating_sub(start_minutes) as f64;
    let width = (duration * config.scale.pixels_per_minute())
        .max(config.minimum_bar_width)
        .max(0.0);

    Some(BarGeometry {
        incident_id: incident.id,
        row,
        x: config.scale.minutes_to_pixels(start_minutes as f64),
        width,
        y: row_y + BAR_INSET,
        height: (config.bar_height - 2.0 * BAR_INSET).max(0.0),
        start_minutes,
        end_minutes,
        category: incident.category.clone(),
        style: incident.category.style(),
        malformed,
    })
}
