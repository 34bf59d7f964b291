//! Clip requests accepted by the scheduler.

use serde::{Deserialize, Serialize};

use crate::Result;

fn default_speed() -> f32 {
    1.0
}

/// One clip to enqueue: an animation input, optional paired audio input and
/// playback speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipRequest {
    pub animation: usize,
    #[serde(default)]
    pub audio: Option<usize>,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl ClipRequest {
    pub fn new(animation: usize) -> Self {
        Self {
            animation,
            audio: None,
            speed: default_speed(),
        }
    }

    pub fn with_audio(mut self, audio: usize) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Pair animation indices with a parallel audio list.
    ///
    /// Negative audio entries, and entries missing because `audios` is shorter
    /// than `animations`, mean "no audio".
    pub fn pair(animations: &[usize], audios: Option<&[i32]>) -> Vec<ClipRequest> {
        animations
            .iter()
            .enumerate()
            .map(|(i, &animation)| {
                let audio = audios
                    .and_then(|a| a.get(i))
                    .and_then(|&a| usize::try_from(a).ok());
                ClipRequest {
                    animation,
                    audio,
                    speed: default_speed(),
                }
            })
            .collect()
    }

    /// Parse a JSON array of requests.
    pub fn list_from_json(json: &str) -> Result<Vec<ClipRequest>> {
        Ok(serde_json::from_str(json)?)
    }
}
