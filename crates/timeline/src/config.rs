use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Seconds, TimelineError, TrackCategory};

/// A lane created at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackConfig {
    pub name: String,
    pub category: TrackCategory,
}

impl TrackConfig {
    pub fn new(name: impl Into<String>, category: TrackCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Zoom bounds in pixels per second.
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub default_zoom: f64,
    /// Quantization unit for drag/resize results.
    pub snap_grid: Seconds,
    pub min_duration: Seconds,
    /// Edge distance at which a moving placement aligns to a neighbor.
    pub magnet_threshold: Seconds,
    pub min_session_seconds: Seconds,
    /// Playback advance per animation tick.
    pub tick_seconds: Seconds,
    pub skip_seconds: Seconds,
    pub transition_seconds: Seconds,
    pub ruler_min_spacing_px: f64,
    pub tracks: Vec<TrackConfig>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            zoom_min: 20.0,
            zoom_max: 200.0,
            default_zoom: 50.0,
            snap_grid: 0.5,
            min_duration: 1.0,
            magnet_threshold: 1.0,
            min_session_seconds: 10.0,
            tick_seconds: 1.0 / 60.0,
            skip_seconds: 10.0,
            transition_seconds: 8.0,
            ruler_min_spacing_px: 60.0,
            tracks: default_tracks(),
        }
    }
}

pub fn default_tracks() -> Vec<TrackConfig> {
    vec![
        TrackConfig::new("Video 1", TrackCategory::Video),
        TrackConfig::new("AI Transitions", TrackCategory::Ai),
        TrackConfig::new("Audio 1", TrackCategory::Audio),
        TrackConfig::new("Adjustments", TrackCategory::Adjustment),
        TrackConfig::new("Effects", TrackCategory::Effect),
    ]
}

impl LayoutConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimelineError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, TimelineError> {
        let config: LayoutConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        let positive = [
            ("zoom_min", self.zoom_min),
            ("zoom_max", self.zoom_max),
            ("default_zoom", self.default_zoom),
            ("snap_grid", self.snap_grid),
            ("min_duration", self.min_duration),
            ("min_session_seconds", self.min_session_seconds),
            ("tick_seconds", self.tick_seconds),
            ("ruler_min_spacing_px", self.ruler_min_spacing_px),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TimelineError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let non_negative = [
            ("magnet_threshold", self.magnet_threshold),
            ("skip_seconds", self.skip_seconds),
            ("transition_seconds", self.transition_seconds),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TimelineError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.zoom_min > self.zoom_max {
            return Err(TimelineError::InvalidConfig(format!(
                "zoom_min {} exceeds zoom_max {}",
                self.zoom_min, self.zoom_max
            )));
        }
        if self.tracks.is_empty() {
            return Err(TimelineError::InvalidConfig(
                "at least one track is required".to_string(),
            ));
        }
        Ok(())
    }
}
