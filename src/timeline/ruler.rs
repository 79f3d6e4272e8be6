use super::coordinate::{format_clock, TimeScale};
use crate::error::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickKind {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub minutes: u32,
    pub x: f64,
    pub kind: TickKind,
    /// `HH:MM`, major ticks only.
    pub label: Option<String>,
}

/// One tick per whole minute of the window. Every `major_interval_minutes`
/// and the window's closing edge are labelled major ticks.
pub fn ruler(scale: &TimeScale, major_interval_minutes: u32) -> Result<Vec<Tick>> {
    if major_interval_minutes == 0 {
        return Err(Error::Config(
            "major tick interval must be at least one minute".to_string(),
        ));
    }

    let window = scale.day_window_minutes();
    let ticks = (0..=window)
        .map(|minutes| {
            let x = scale.minutes_to_pixels(minutes as f64);
            if minutes % major_interval_minutes == 0 || minutes == window {
                Tick {
                    minutes,
                    x,
                    kind: TickKind::Major,
                    label: Some(format_clock(minutes as f64)),
                }
            } else {
                Tick {
                    minutes,
                    x,
                    kind: TickKind::Minor,
                    label: None,
                }
            }
        })
        .collect();

    Ok(ticks)
}
