//! Editor configuration.

use crate::gesture::SnapOptions;
use crate::snap::ANGLE_SNAP_INCREMENT;
use serde::{Deserialize, Serialize};

/// Surface snapping settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Screen-space distance in pixels.
    pub threshold: f64,
    /// Degrees for shift-locked rotation.
    pub angle_increment: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 5.0,
            angle_increment: ANGLE_SNAP_INCREMENT,
        }
    }
}

impl SnapConfig {
    /// Options in canvas units for a viewport at `zoom`.
    pub fn options(&self, zoom: f64) -> SnapOptions {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        SnapOptions {
            enabled: self.enabled,
            threshold: self.threshold / zoom,
            angle_increment: self.angle_increment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Cap on undo entries; `None` keeps everything.
    pub max_entries: Option<usize>,
}

/// Keyboard nudge distances in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgeConfig {
    pub step: f64,
    pub big_step: f64,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            big_step: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Minimum milliseconds between captured frames; 0 captures every change.
    pub cadence_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self { min: 0.02, max: 256.0 }
    }
}

impl ZoomConfig {
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

/// All editor settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub history: HistoryConfig,
    pub nudge: NudgeConfig,
    pub recorder: RecorderConfig,
    pub zoom: ZoomConfig,
}

impl EditorConfig {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.snap.enabled);
        assert_eq!(config.snap.threshold, 5.0);
        assert_eq!(config.snap.angle_increment, 15.0);
        assert_eq!(config.history.max_entries, None);
        assert_eq!(config.nudge.big_step, 10.0);
        assert_eq!(config.recorder.cadence_ms, 0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"snap": {"threshold": 8.0}, "history": {"max_entries": 50}}"#)
            .unwrap();
        assert_eq!(config.snap.threshold, 8.0);
        assert!(config.snap.enabled);
        assert_eq!(config.history.max_entries, Some(50));
        assert_eq!(config.zoom, ZoomConfig::default());

        let back = EditorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_snap_threshold_follows_zoom() {
        let snap = SnapConfig::default();
        assert_eq!(snap.options(2.0).threshold, 2.5);
        assert_eq!(snap.options(0.0).threshold, 5.0);
    }

    #[test]
    fn test_zoom_clamp() {
        let zoom = ZoomConfig::default();
        assert_eq!(zoom.clamp(1000.0), 256.0);
        assert_eq!(zoom.clamp(0.0), 0.02);
        assert_eq!(zoom.clamp(3.0), 3.0);
    }
}
