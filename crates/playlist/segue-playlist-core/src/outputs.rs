//! Output contracts from the scheduler.
//!
//! The mixer writes are the real side effect of a tick. Outputs mirror them
//! as plain data (one change per write) next to a list of semantic events, so
//! hosts can forward or log a frame without wrapping their mixer.

use serde::{Deserialize, Serialize};

use crate::ids::UnitId;

/// One weight written to the mixer this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightChange {
    pub unit: UnitId,
    pub animation: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<usize>,
    pub weight: f32,
}

/// Discrete playback signals emitted while ticking or appending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlaylistEvent {
    UnitStarted { unit: UnitId, animation: usize },
    /// The unit entered its fade-out; its successor starts blending in.
    HandoffReady { unit: UnitId },
    UnitFinished { unit: UnitId },
    /// Sole remaining unit finished and was rewound to play again.
    UnitLooped { unit: UnitId },
    /// Finished unit removed from the head of the queue.
    UnitRetired { unit: UnitId },
    /// Queued unit dropped by a replacing append or `clear`.
    UnitDiscarded { unit: UnitId },
}

/// Per-tick output buffer. Cleared at the start of every tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub changes: Vec<WeightChange>,
    pub events: Vec<PlaylistEvent>,
    /// Events dropped this tick because of `Config::max_events_per_tick`.
    #[serde(default)]
    pub dropped_events: usize,
}

impl Outputs {
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
        self.dropped_events = 0;
    }

    pub fn push_change(&mut self, change: WeightChange) {
        self.changes.push(change);
    }

    /// Push an event unless `cap` events are already buffered.
    pub fn push_event(&mut self, event: PlaylistEvent, cap: usize) {
        if self.events.len() < cap {
            self.events.push(event);
        } else {
            self.dropped_events += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_past_cap_are_counted_not_kept() {
        let mut out = Outputs::default();
        for i in 0..3 {
            out.push_event(PlaylistEvent::UnitFinished { unit: UnitId(i) }, 2);
        }
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.dropped_events, 1);
        out.clear();
        assert!(out.is_empty());
        assert_eq!(out.dropped_events, 0);
    }

    #[test]
    fn change_without_audio_omits_the_field() {
        let change = WeightChange {
            unit: UnitId(3),
            animation: 1,
            audio: None,
            weight: 0.5,
        };
        let v = serde_json::to_value(&change).unwrap();
        assert!(v.get("audio").is_none());
        assert_eq!(v["unit"], 3);
    }
}
