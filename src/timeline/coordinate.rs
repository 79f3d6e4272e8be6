//! Conversions between absolute timestamps, day-relative minutes/seconds and
//! pixel offsets on the timeline.
//!
//! All timestamps are projected onto a single reference clock (UTC). Midnight
//! is minute 0; a time-of-day of `24:00` is not representable as a timestamp.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

pub const MINUTES_PER_DAY: u32 = 1440;
pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_DAY: u32 = MINUTES_PER_DAY * SECONDS_PER_MINUTE;

/// Parse an ISO-8601 instant onto the reference clock.
///
/// Offsets are honoured (the instant is converted to UTC); timestamps without
/// an offset are read as UTC. Anything before the Unix epoch is rejected.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_timestamp(value, "empty timestamp"));
    }

    let parsed = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(rfc_err) => {
            let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .map_err(|_| Error::invalid_timestamp(value, rfc_err.to_string()))?;
            Utc.from_utc_datetime(&naive)
        }
    };

    if parsed.timestamp() < 0 {
        return Err(Error::invalid_timestamp(
            value,
            "timestamp precedes the Unix epoch",
        ));
    }

    Ok(parsed)
}

/// Whole minutes since the reference midnight. Seconds are truncated.
pub fn day_minutes(instant: &DateTime<Utc>) -> u32 {
    instant.hour() * 60 + instant.minute()
}

/// Seconds since the reference midnight.
pub fn day_seconds(instant: &DateTime<Utc>) -> u32 {
    // Leap seconds report second() == 59, which keeps this below SECONDS_PER_DAY.
    instant.hour() * 3600 + instant.minute() * 60 + instant.second()
}

pub fn to_day_minutes(timestamp: &str) -> Result<u32> {
    parse_timestamp(timestamp).map(|dt| day_minutes(&dt))
}

pub fn to_day_seconds(timestamp: &str) -> Result<u32> {
    parse_timestamp(timestamp).map(|dt| day_seconds(&dt))
}

/// Linear mapping between day-relative minutes and horizontal pixel offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pixels_per_minute: f64,
    left_margin: f64,
    day_window_minutes: u32,
}

impl TimeScale {
    pub fn new(pixels_per_minute: f64, left_margin: f64) -> Result<Self> {
        if !pixels_per_minute.is_finite() || pixels_per_minute <= 0.0 {
            return Err(Error::InvalidScale(format!(
                "pixels per minute must be positive, got {}",
                pixels_per_minute
            )));
        }
        if !left_margin.is_finite() || left_margin < 0.0 {
            return Err(Error::InvalidScale(format!(
                "left margin must be non-negative, got {}",
                left_margin
            )));
        }

        Ok(Self {
            pixels_per_minute,
            left_margin,
            day_window_minutes: MINUTES_PER_DAY,
        })
    }

    /// Restrict the window the scale clamps into. Must lie in `1..=1440`.
    pub fn with_day_window(mut self, minutes: u32) -> Result<Self> {
        if minutes == 0 || minutes > MINUTES_PER_DAY {
            return Err(Error::InvalidScale(format!(
                "day window must be between 1 and {} minutes, got {}",
                MINUTES_PER_DAY, minutes
            )));
        }
        self.day_window_minutes = minutes;
        Ok(self)
    }

    pub fn pixels_per_minute(&self) -> f64 {
        self.pixels_per_minute
    }

    pub fn left_margin(&self) -> f64 {
        self.left_margin
    }

    pub fn day_window_minutes(&self) -> u32 {
        self.day_window_minutes
    }

    pub fn minutes_to_pixels(&self, minutes: f64) -> f64 {
        minutes * self.pixels_per_minute + self.left_margin
    }

    /// Inverse of [`minutes_to_pixels`](Self::minutes_to_pixels), clamped to the day window.
    pub fn pixels_to_minutes(&self, x: f64) -> f64 {
        let minutes = (x - self.left_margin) / self.pixels_per_minute;
        if minutes.is_nan() {
            return 0.0;
        }
        minutes.clamp(0.0, self.day_window_minutes as f64)
    }

    /// Pixel width of the full day window, excluding the left margin.
    pub fn window_width(&self) -> f64 {
        self.day_window_minutes as f64 * self.pixels_per_minute
    }
}

fn clamp_day(minutes: f64) -> f64 {
    if minutes.is_nan() {
        return 0.0;
    }
    minutes.clamp(0.0, MINUTES_PER_DAY as f64)
}

/// `HH:MM`, 24-hour. Fractional minutes are dropped; 1440 renders as `24:00`.
pub fn format_clock(minutes: f64) -> String {
    let whole = clamp_day(minutes).floor() as u32;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// `HH:MM:SS`, 24-hour, rounded to the nearest second.
pub fn format_clock_with_seconds(minutes: f64) -> String {
    let total_seconds = (clamp_day(minutes) * SECONDS_PER_MINUTE as f64).round() as u32;
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}
