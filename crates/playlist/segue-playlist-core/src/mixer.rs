//! Mixer capability traits.
//!
//! The host owns the mixing graph (clip sources wired into a weighted mixer).
//! Core code only talks to it through these traits, so the scheduler can run
//! against a game engine, a WASM bridge or the in-memory [`MemoryMixer`].

use serde::{Deserialize, Serialize};

/// Weighted-sum node: one weight per input index.
pub trait MixerPort {
    fn input_count(&self) -> usize;
    fn set_input_weight(&mut self, index: usize, weight: f32);
}

/// Clip sources connected to the mixer inputs, addressed by the same index.
pub trait ClipSource {
    /// Clip length in seconds.
    fn duration(&self, index: usize) -> f32;
    fn seek(&mut self, index: usize, time: f32);
    fn set_speed(&mut self, index: usize, speed: f32);
}

/// Animation side of the graph: a mixer whose inputs are clip sources.
pub trait ClipMixer: MixerPort + ClipSource {}

impl<T: MixerPort + ClipSource + ?Sized> ClipMixer for T {}

impl<T: MixerPort + ?Sized> MixerPort for &mut T {
    #[inline]
    fn input_count(&self) -> usize {
        (**self).input_count()
    }
    #[inline]
    fn set_input_weight(&mut self, index: usize, weight: f32) {
        (**self).set_input_weight(index, weight)
    }
}

impl<T: ClipSource + ?Sized> ClipSource for &mut T {
    #[inline]
    fn duration(&self, index: usize) -> f32 {
        (**self).duration(index)
    }
    #[inline]
    fn seek(&mut self, index: usize, time: f32) {
        (**self).seek(index, time)
    }
    #[inline]
    fn set_speed(&mut self, index: usize, speed: f32) {
        (**self).set_speed(index, speed)
    }
}

/// Audio port for hosts without an audio mixer. Has no inputs, so every
/// audio index degrades to "no audio".
#[derive(Copy, Clone, Debug, Default)]
pub struct NoAudio;

impl MixerPort for NoAudio {
    #[inline]
    fn input_count(&self) -> usize {
        0
    }
    #[inline]
    fn set_input_weight(&mut self, _index: usize, _weight: f32) {}
}

/// In-memory mixer and clip table.
///
/// Tracks per-input weight, playhead and speed, plus an ordered log of every
/// weight write. Used for headless playback and in tests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryMixer {
    durations: Vec<f32>,
    weights: Vec<f32>,
    times: Vec<f32>,
    speeds: Vec<f32>,
    #[serde(default)]
    writes: Vec<(usize, f32)>,
}

impl MemoryMixer {
    /// One input per clip duration (seconds), all weights at 0.
    pub fn new(durations: Vec<f32>) -> Self {
        let n = durations.len();
        Self {
            durations,
            weights: vec![0.0; n],
            times: vec![0.0; n],
            speeds: vec![1.0; n],
            writes: Vec::new(),
        }
    }

    /// Mixer with `count` zero-length inputs (e.g. an audio mixer).
    pub fn with_inputs(count: usize) -> Self {
        Self::new(vec![0.0; count])
    }

    pub fn weight(&self, index: usize) -> Option<f32> {
        self.weights.get(index).copied()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Last seek position of a clip.
    pub fn time(&self, index: usize) -> Option<f32> {
        self.times.get(index).copied()
    }

    pub fn speed(&self, index: usize) -> Option<f32> {
        self.speeds.get(index).copied()
    }

    /// Every `set_input_weight` call since construction or the last `clear_writes`.
    pub fn writes(&self) -> &[(usize, f32)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl MixerPort for MemoryMixer {
    fn input_count(&self) -> usize {
        self.weights.len()
    }

    fn set_input_weight(&mut self, index: usize, weight: f32) {
        if let Some(w) = self.weights.get_mut(index) {
            *w = weight;
            self.writes.push((index, weight));
        }
    }
}

impl ClipSource for MemoryMixer {
    fn duration(&self, index: usize) -> f32 {
        self.durations.get(index).copied().unwrap_or(0.0)
    }

    fn seek(&mut self, index: usize, time: f32) {
        if let Some(t) = self.times.get_mut(index) {
            *t = time;
        }
    }

    fn set_speed(&mut self, index: usize, speed: f32) {
        if let Some(s) = self.speeds.get_mut(index) {
            *s = speed;
        }
    }
}
