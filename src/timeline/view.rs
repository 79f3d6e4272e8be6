//! Thin rendering layer: owns the loaded cameras, keeps the derived layout in
//! sync with the scale, forwards pointer events to the scrubber and assembles
//! a paintable [`TimelineScene`].

use super::coordinate::{format_clock_with_seconds, TimeScale};
use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::layout::{layout_with_diagnostics, CameraRow, LayoutConfig};
use super::model::Camera;
use super::ruler::{ruler, Tick};
use super::scrubber::{ScrubberConfig, ScrubberController, ScrubberObserver, ScrubberUpdate};
use crate::error::Result;
use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

/// The camera/incident collaborator the view loads from.
#[async_trait]
pub trait CameraSource: Send + Sync {
    async fn fetch_cameras(&self) -> anyhow::Result<Vec<Camera>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub layout: LayoutConfig,
    pub scrubber: ScrubberConfig,
    pub major_tick_minutes: u32,
    /// Blank space after the window's closing edge.
    pub right_padding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrubberMarker {
    pub x: f64,
    pub cursor_minutes: f64,
    /// `HH:MM:SS`
    pub label: String,
    pub dragging: bool,
    pub snapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineScene {
    pub width: f64,
    pub height: f64,
    pub rows: Vec<CameraRow>,
    pub ticks: Vec<Tick>,
    pub scrubber: ScrubberMarker,
}

/// Discards diagnostics the layout pass has already reported.
struct AlreadyReported;

impl DiagnosticSink for AlreadyReported {
    fn report(&self, _diagnostic: Diagnostic) {}
}

pub struct TimelineView {
    config: ViewConfig,
    cameras: Vec<Camera>,
    rows: Vec<CameraRow>,
    scrubber: ScrubberController,
    diagnostics: Arc<dyn DiagnosticSink + Send + Sync>,
}

impl TimelineView {
    pub fn new(config: ViewConfig, diagnostics: Arc<dyn DiagnosticSink + Send + Sync>) -> Self {
        Self {
            config,
            cameras: Vec::new(),
            rows: Vec::new(),
            scrubber: ScrubberController::new(config.scrubber),
            diagnostics,
        }
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn rows(&self) -> &[CameraRow] {
        &self.rows
    }

    pub fn scrubber(&self) -> &ScrubberController {
        &self.scrubber
    }

    pub fn subscribe(&mut self, observer: impl ScrubberObserver + 'static) {
        self.scrubber.subscribe(observer);
    }

    /// Fetch the camera list and replace the current one wholesale.
    ///
    /// On failure the previously loaded cameras stay in place.
    pub async fn reload(&mut self, source: &dyn CameraSource) -> anyhow::Result<usize> {
        let cameras = match source.fetch_cameras().await {
            Ok(cameras) => cameras,
            Err(e) => {
                warn!("Failed to load cameras, keeping {} loaded: {}", self.cameras.len(), e);
                return Err(e);
            }
        };

        let count = cameras.len();
        self.replace_cameras(cameras);
        info!("Timeline loaded {} cameras", count);
        Ok(count)
    }

    pub fn replace_cameras(&mut self, cameras: Vec<Camera>) {
        self.cameras = cameras;
        self.rows = layout_with_diagnostics(&self.cameras, &self.config.layout, self.diagnostics.as_ref());
        self.scrubber.replace_incidents(&self.cameras, &AlreadyReported);
    }

    pub fn set_pixels_per_minute(&mut self, pixels_per_minute: f64) -> Result<()> {
        let current = self.config.layout.scale;
        let scale = TimeScale::new(pixels_per_minute, current.left_margin())?
            .with_day_window(current.day_window_minutes())?;

        self.config.layout.scale = scale;
        self.config.scrubber.scale = scale;
        self.scrubber.set_scale(scale);
        // Same records as the last load; their problems were reported then.
        self.rows = layout_with_diagnostics(&self.cameras, &self.config.layout, &AlreadyReported);
        Ok(())
    }

    pub fn pointer_down(&mut self, x: f64) -> bool {
        self.scrubber.pointer_down(x)
    }

    pub fn pointer_move(&mut self, x: f64) -> Option<ScrubberUpdate> {
        self.scrubber.pointer_move(x)
    }

    pub fn pointer_up(&mut self) -> Option<ScrubberUpdate> {
        self.scrubber.pointer_up()
    }

    pub fn seek(&mut self, minutes: f64) -> Option<ScrubberUpdate> {
        self.scrubber.seek(minutes)
    }

    pub fn reset(&mut self) {
        self.scrubber.reset();
    }

    pub fn scene(&self) -> Result<TimelineScene> {
        let layout = &self.config.layout;
        let scale = layout.scale;
        let state = self.scrubber.state();

        let width = scale.minutes_to_pixels(scale.day_window_minutes() as f64) + self.config.right_padding;
        let height = layout.header_height + self.rows.len() as f64 * layout.row_height
            - (layout.row_height - layout.bar_height);

        Ok(TimelineScene {
            width,
            height: height.max(0.0),
            rows: self.rows.clone(),
            ticks: ruler(&scale, self.config.major_tick_minutes)?,
            scrubber: ScrubberMarker {
                x: scale.minutes_to_pixels(state.cursor_minutes),
                cursor_minutes: state.cursor_minutes,
                label: format_clock_with_seconds(state.cursor_minutes),
                dragging: state.dragging,
                snapped: state.snap_target.is_some(),
            },
        })
    }
}
