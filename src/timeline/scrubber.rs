//! The draggable playback cursor.
//!
//! [`ScrubberController`] is a two-state machine (`Idle`, `Dragging`) fed by
//! pointer events from the host UI loop. While dragging, every move is mapped
//! to day-relative minutes and snapped to nearby incident boundaries.
//!
//! The controller owns its state exclusively. Pointer events must be delivered
//! one at a time, as a UI event loop does.

use super::coordinate::{day_seconds, TimeScale, SECONDS_PER_MINUTE};
use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::model::Camera;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which qualifying boundary wins when several lie within the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapPolicy {
    /// The last qualifying boundary in camera-then-incident order (start before end).
    #[default]
    LastMatch,
    /// The boundary closest to the pointer; the earliest one on ties.
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubberConfig {
    pub scale: TimeScale,
    pub snap_threshold_seconds: u32,
    pub snap_policy: SnapPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Start,
    End,
}

/// An incident boundary the cursor can snap to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapTarget {
    pub camera_id: Uuid,
    pub incident_id: Uuid,
    pub boundary: Boundary,
    pub seconds: u32,
}

impl SnapTarget {
    pub fn minutes(&self) -> f64 {
        self.seconds as f64 / SECONDS_PER_MINUTE as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { origin_x: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrubberState {
    /// Always within `[0, day window]`.
    pub cursor_minutes: f64,
    pub dragging: bool,
    pub snap_target: Option<SnapTarget>,
}

/// What observers receive after every cursor change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrubberUpdate {
    pub cursor_minutes: f64,
    pub is_dragging: bool,
    pub snapped: bool,
}

pub trait ScrubberObserver: Send {
    fn on_update(&mut self, update: &ScrubberUpdate);
}

impl<F> ScrubberObserver for F
where
    F: FnMut(&ScrubberUpdate) + Send,
{
    fn on_update(&mut self, update: &ScrubberUpdate) {
        self(update)
    }
}

pub struct ScrubberController {
    config: ScrubberConfig,
    drag: DragState,
    state: ScrubberState,
    committed_minutes: f64,
    candidates: Vec<SnapTarget>,
    observers: Vec<Box<dyn ScrubberObserver>>,
}

impl ScrubberController {
    pub fn new(config: ScrubberConfig) -> Self {
        Self {
            config,
            drag: DragState::Idle,
            state: ScrubberState {
                cursor_minutes: 0.0,
                dragging: false,
                snap_target: None,
            },
            committed_minutes: 0.0,
            candidates: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    pub fn state(&self) -> &ScrubberState {
        &self.state
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Cursor position as of the last pointer release (or reset).
    pub fn committed_minutes(&self) -> f64 {
        self.committed_minutes
    }

    pub fn snap_candidates(&self) -> &[SnapTarget] {
        &self.candidates
    }

    pub fn subscribe(&mut self, observer: impl ScrubberObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Change the pixel scale, e.g. on zoom. The cursor keeps its time position,
    /// pulled back inside the window if the new one is shorter.
    pub fn set_scale(&mut self, scale: TimeScale) {
        self.config.scale = scale;
        let window = scale.day_window_minutes() as f64;
        self.state.cursor_minutes = self.state.cursor_minutes.min(window);
        self.committed_minutes = self.committed_minutes.min(window);
    }

    /// Rebuild snap candidates from a freshly loaded camera list and reset.
    ///
    /// Incidents with unreadable timestamps or `end < start` are reported to
    /// `sink` and left out; they never interrupt dragging.
    pub fn replace_incidents(&mut self, cameras: &[Camera], sink: &dyn DiagnosticSink) {
        let window_seconds = self.config.scale.day_window_minutes() * SECONDS_PER_MINUTE;
        let mut candidates = Vec::new();

        for camera in cameras {
            for incident in &camera.incidents {
                let (start, end) = match incident.bounds() {
                    Ok(bounds) => bounds,
                    Err(error) => {
                        sink.report(Diagnostic::InvalidTimestamp {
                            camera_id: camera.camera_id,
                            incident_id: incident.id,
                            error,
                        });
                        continue;
                    }
                };

                if end < start {
                    sink.report(Diagnostic::MalformedIncident {
                        camera_id: camera.camera_id,
                        incident_id: incident.id,
                        error: incident.malformed_error(),
                    });
                    continue;
                }

                let start_seconds = day_seconds(&start);
                if start_seconds >= window_seconds {
                    continue;
                }
                let end_seconds = if end.date_naive() > start.date_naive() {
                    window_seconds
                } else {
                    day_seconds(&end).min(window_seconds)
                };

                candidates.push(SnapTarget {
                    camera_id: camera.camera_id,
                    incident_id: incident.id,
                    boundary: Boundary::Start,
                    seconds: start_seconds,
                });
                candidates.push(SnapTarget {
                    camera_id: camera.camera_id,
                    incident_id: incident.id,
                    boundary: Boundary::End,
                    seconds: end_seconds,
                });
            }
        }

        debug!("Loaded {} snap candidates", candidates.len());
        self.candidates = candidates;
        self.reset();
    }

    /// `Idle -> Dragging`. The cursor does not move until the first pointer move.
    pub fn pointer_down(&mut self, x: f64) -> bool {
        match self.drag {
            DragState::Idle => {
                debug!("Scrubber drag started at x={}", x);
                self.drag = DragState::Dragging { origin_x: x };
                self.state.dragging = true;
                true
            }
            DragState::Dragging { .. } => false,
        }
    }

    /// Move the cursor while dragging. Ignored (returns `None`) when idle.
    pub fn pointer_move(&mut self, x: f64) -> Option<ScrubberUpdate> {
        if self.drag == DragState::Idle {
            return None;
        }

        let raw_minutes = self.config.scale.pixels_to_minutes(x);
        let snap = self.resolve_snap(raw_minutes);
        let cursor_minutes = snap.map_or(raw_minutes, |target| target.minutes());
        trace!(
            "Scrubber move x={} raw={} cursor={} snapped={}",
            x,
            raw_minutes,
            cursor_minutes,
            snap.is_some()
        );

        self.state.cursor_minutes = cursor_minutes;
        self.state.snap_target = snap;
        Some(self.emit())
    }

    /// `Dragging -> Idle`, committing the last emitted position.
    pub fn pointer_up(&mut self) -> Option<ScrubberUpdate> {
        if self.drag == DragState::Idle {
            return None;
        }

        self.drag = DragState::Idle;
        self.state.dragging = false;
        self.committed_minutes = self.state.cursor_minutes;
        debug!("Scrubber committed at {} minutes", self.committed_minutes);
        Some(self.emit())
    }

    /// Return to `Idle` from any state, leaving the cursor where it is.
    pub fn reset(&mut self) {
        let was_dragging = self.drag != DragState::Idle;
        self.drag = DragState::Idle;
        self.state.dragging = false;
        self.state.snap_target = None;
        self.committed_minutes = self.state.cursor_minutes;
        if was_dragging {
            self.emit();
        }
    }

    /// Place the cursor programmatically (clamped to the window). Only honoured when idle.
    pub fn seek(&mut self, minutes: f64) -> Option<ScrubberUpdate> {
        if self.drag != DragState::Idle {
            return None;
        }

        let window = self.config.scale.day_window_minutes() as f64;
        let minutes = if minutes.is_nan() { 0.0 } else { minutes.clamp(0.0, window) };
        self.state.cursor_minutes = minutes;
        self.state.snap_target = None;
        self.committed_minutes = minutes;
        Some(self.emit())
    }

    /// The boundary a drag at `drag_minutes` would snap to, if any.
    pub fn resolve_snap(&self, drag_minutes: f64) -> Option<SnapTarget> {
        let drag_seconds = drag_minutes * SECONDS_PER_MINUTE as f64;
        let threshold = self.config.snap_threshold_seconds as f64;
        let mut within = self
            .candidates
            .iter()
            .map(|target| ((drag_seconds - target.seconds as f64).abs(), target))
            .filter(|(distance, _)| *distance <= threshold);

        match self.config.snap_policy {
            SnapPolicy::LastMatch => within.last().map(|(_, target)| *target),
            SnapPolicy::Nearest => {
                let first = within.next();
                within
                    .fold(first, |best, candidate| match best {
                        Some((best_distance, _)) if best_distance <= candidate.0 => best,
                        _ => Some(candidate),
                    })
                    .map(|(_, target)| *target)
            }
        }
    }

    fn emit(&mut self) -> ScrubberUpdate {
        let update = ScrubberUpdate {
            cursor_minutes: self.state.cursor_minutes,
            is_dragging: self.state.dragging,
            snapped: self.state.snap_target.is_some(),
        };
        for observer in self.observers.iter_mut() {
            observer.on_update(&update);
        }
        update
    }
}
