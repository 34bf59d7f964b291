//! Core configuration for segue-playlist-core.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Scheduler-wide configuration.
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length in seconds of automatic fade-in/fade-out windows.
    ///
    /// Automatic windows are capped by the clip length: a fade-in lasts
    /// `min(blend_seconds, duration)` and a fade-out starts at
    /// `duration - blend_seconds` (or at 0 for clips shorter than that).
    pub blend_seconds: f32,

    /// Maximum events to retain per tick; extra events are dropped.
    pub max_events_per_tick: usize,

    /// Initial capacity hint for the unit queue.
    pub initial_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blend_seconds: 0.5,
            max_events_per_tick: 64,
            initial_queue_capacity: 8,
        }
    }
}

impl Config {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        Ok(cfg.sanitized())
    }

    /// Replace an unusable `blend_seconds`: negative becomes 0 (hard cuts),
    /// non-finite falls back to the default.
    pub fn sanitized(mut self) -> Self {
        let blend = self.blend_seconds;
        if !blend.is_finite() {
            self.blend_seconds = Self::default().blend_seconds;
            warn!(
                "blend_seconds {} is not finite; using {}",
                blend, self.blend_seconds
            );
        } else if blend < 0.0 {
            self.blend_seconds = 0.0;
            warn!("blend_seconds {} is negative; using 0", blend);
        }
        self
    }

    fn blend_len(&self) -> f32 {
        if self.blend_seconds.is_finite() {
            self.blend_seconds.max(0.0)
        } else {
            Self::default().blend_seconds
        }
    }

    /// Automatic fade-in length for a clip of `total_time` seconds.
    #[inline]
    pub fn auto_start_blend(&self, total_time: f32) -> f32 {
        self.blend_len().min(total_time)
    }

    /// Automatic fade-out start for a clip of `total_time` seconds.
    #[inline]
    pub fn auto_end_blend(&self, total_time: f32) -> f32 {
        let blend = self.blend_len();
        if total_time < blend {
            0.0
        } else {
            total_time - blend
        }
    }
}
