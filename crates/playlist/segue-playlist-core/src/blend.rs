//! Blend unit: the per-clip weight state machine.
//!
//! A unit owns one queued playback of a clip. Its timeline is split into three
//! zones by two marks measured from `Start`:
//!
//! ```text
//!                      total_time
//! +-----------+----------------------+-----------+
//! 0   start_blend_time        end_blend_time     total_time
//!    (fade-in ends)          (fade-out begins)
//! ```
//!
//! Weights are computed from the ratio of elapsed time to window length rather
//! than by accumulating per-tick steps, so they never drift with frame timing.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::PlaylistError;
use crate::ids::UnitId;
use crate::mixer::{ClipMixer, ClipSource, MixerPort};
use crate::Result;

/// Start mark meaning "no fade-in": weight jumps to 1 on start.
const NO_FADE_IN: f32 = -1.0;
/// End mark meaning "no fade-out": never reached by any finite time.
const NO_FADE_OUT: f32 = f32::INFINITY;

/// Lifecycle of a blend unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    /// Created (or looped back) and waiting for `start`.
    Pending,
    /// Timeline advancing; weight written every tick.
    Processing,
    /// Timeline reached the clip end.
    Done,
}

impl UnitStatus {
    /// Get the name of this status
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Done => "done",
        }
    }

    /// Whether the unit has been started and may hold a non-zero mixer weight.
    #[inline]
    pub fn has_started(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// How a blend window is chosen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendWindow {
    /// No fade on this side.
    #[default]
    None,
    /// Derived from the clip length with [`Config::blend_seconds`].
    Auto,
    /// Explicit mark in seconds from start.
    Seconds(f32),
}

/// Struct form of the unit configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCfg {
    pub speed: f32,
    pub start_blend: BlendWindow,
    pub end_blend: BlendWindow,
}

impl Default for UnitCfg {
    fn default() -> Self {
        Self {
            speed: 1.0,
            start_blend: BlendWindow::None,
            end_blend: BlendWindow::None,
        }
    }
}

/// What a single `tick` did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The unit was processing and wrote its weight.
    pub ticked: bool,
    /// `can_start_next` latched during this tick.
    pub handoff_ready: bool,
    /// The unit reached `Done` during this tick.
    pub finished: bool,
}

/// Per-clip crossfade state machine.
#[derive(Clone, Debug)]
pub struct BlendUnit {
    id: UnitId,
    animation_index: usize,
    audio_index: Option<usize>,
    speed: f32,
    total_time: f32,
    start_blend_time: f32,
    end_blend_time: f32,
    processing_time: f32,
    weight: f32,
    can_start_next: bool,
    status: UnitStatus,
}

/// Fails with `InvalidClipIndex` unless `index` addresses a mixer input.
pub(crate) fn check_clip_index(index: usize, input_count: usize) -> Result<()> {
    if index < input_count {
        Ok(())
    } else {
        Err(PlaylistError::InvalidClipIndex { index, input_count })
    }
}

impl BlendUnit {
    /// Create a unit for the clip at `animation_index`.
    ///
    /// Reads the clip length, rewinds the clip and applies the default speed.
    /// An `audio_index` the audio mixer does not have is dropped.
    pub fn new<M, A>(
        id: UnitId,
        mixer: &mut M,
        audio: &A,
        animation_index: usize,
        audio_index: Option<usize>,
    ) -> Result<Self>
    where
        M: ClipMixer + ?Sized,
        A: MixerPort + ?Sized,
    {
        check_clip_index(animation_index, mixer.input_count())?;

        let raw = mixer.duration(animation_index);
        let total_time = if raw.is_finite() && raw >= 0.0 {
            raw
        } else {
            warn!(
                "clip {} reports duration {}; treating it as 0",
                animation_index, raw
            );
            0.0
        };

        let audio_index = match audio_index {
            Some(i) if i >= audio.input_count() => {
                warn!(
                    "audio index {} out of range ({} inputs); clip {} plays without audio",
                    i,
                    audio.input_count(),
                    animation_index
                );
                None
            }
            other => other,
        };

        let unit = Self {
            id,
            animation_index,
            audio_index,
            speed: 1.0,
            total_time,
            start_blend_time: NO_FADE_IN,
            end_blend_time: NO_FADE_OUT,
            processing_time: 0.0,
            weight: 0.0,
            can_start_next: false,
            status: UnitStatus::Pending,
        };
        mixer.seek(animation_index, 0.0);
        mixer.set_speed(animation_index, unit.speed);
        Ok(unit)
    }

    // --- configuration -------------------------------------------------

    /// Playback speed of the clip source; negative plays in reverse.
    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        self.speed = speed;
        self
    }

    /// Fade in over `min(cfg.blend_seconds, total_time)`.
    pub fn auto_start_blend(&mut self, cfg: &Config) -> &mut Self {
        self.start_blend_time = cfg.auto_start_blend(self.total_time);
        self
    }

    /// Fade in over `seconds`. Zero or negative disables the fade-in.
    pub fn set_start_blend_time(&mut self, seconds: f32) -> &mut Self {
        self.start_blend_time = seconds;
        self
    }

    /// Fade out over the last `cfg.blend_seconds` of the clip.
    pub fn auto_end_blend(&mut self, cfg: &Config) -> &mut Self {
        self.end_blend_time = cfg.auto_end_blend(self.total_time);
        self
    }

    /// Start fading out `seconds` after start. Values at or past
    /// `total_time` disable the fade-out.
    pub fn set_end_blend_time(&mut self, seconds: f32) -> &mut Self {
        self.end_blend_time = seconds;
        self
    }

    /// Apply a whole [`UnitCfg`] at once.
    pub fn configure(&mut self, unit_cfg: &UnitCfg, cfg: &Config) -> &mut Self {
        self.set_speed(unit_cfg.speed);
        match unit_cfg.start_blend {
            BlendWindow::None => self.set_start_blend_time(NO_FADE_IN),
            BlendWindow::Auto => self.auto_start_blend(cfg),
            BlendWindow::Seconds(s) => self.set_start_blend_time(s),
        };
        match unit_cfg.end_blend {
            BlendWindow::None => self.set_end_blend_time(NO_FADE_OUT),
            BlendWindow::Auto => self.auto_end_blend(cfg),
            BlendWindow::Seconds(s) => self.set_end_blend_time(s),
        };
        self
    }

    // --- state machine -------------------------------------------------

    /// Pending → Processing. Rewinds the clip and applies the speed.
    /// Returns false (and does nothing) in any other state.
    pub fn start<M: ClipSource + ?Sized>(&mut self, clips: &mut M) -> bool {
        if self.status != UnitStatus::Pending {
            return false;
        }
        if self.start_blend_time <= 0.0 {
            self.weight = 1.0;
        }
        clips.seek(self.animation_index, 0.0);
        clips.set_speed(self.animation_index, self.speed);
        self.status = UnitStatus::Processing;
        debug!(
            "unit {:?} started clip {} (duration {}s, blend {}..{})",
            self.id,
            self.animation_index,
            self.total_time,
            self.start_blend_time,
            self.end_blend_time
        );
        true
    }

    /// Advance the timeline by `dt` seconds and write the new weight.
    pub fn tick<M, A>(&mut self, dt: f32, mixer: &mut M, audio: &mut A) -> TickReport
    where
        M: MixerPort + ?Sized,
        A: MixerPort + ?Sized,
    {
        let mut report = TickReport::default();
        if self.status != UnitStatus::Processing {
            return report;
        }
        report.ticked = true;
        self.processing_time += dt;

        let t = self.processing_time;
        if t > self.end_blend_time {
            if !self.can_start_next {
                self.can_start_next = true;
                report.handoff_ready = true;
                debug!("unit {:?} fading out at {}s", self.id, t);
            }
            let span = self.total_time - self.end_blend_time;
            self.weight = if span > 0.0 {
                (1.0 - (t - self.end_blend_time) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
        } else if t < self.start_blend_time {
            self.weight = (t / self.start_blend_time).clamp(0.0, 1.0);
        } else {
            self.weight = 1.0;
        }
        let finished = t >= self.total_time;
        if finished {
            // Exact zero at the clip end, with or without a fade-out.
            self.weight = 0.0;
        }

        self.write_weight(mixer, audio);

        if finished {
            self.status = UnitStatus::Done;
            report.finished = true;
            debug!("unit {:?} finished clip {}", self.id, self.animation_index);
        }
        report
    }

    /// Back to Pending with the timeline rewound. Weight, the handoff latch
    /// and blend windows are kept.
    pub fn reset(&mut self) {
        self.processing_time = 0.0;
        self.status = UnitStatus::Pending;
    }

    /// Force the weight to 0 on both mixers.
    pub fn silence<M, A>(&mut self, mixer: &mut M, audio: &mut A)
    where
        M: MixerPort + ?Sized,
        A: MixerPort + ?Sized,
    {
        self.weight = 0.0;
        self.write_weight(mixer, audio);
    }

    fn write_weight<M, A>(&self, mixer: &mut M, audio: &mut A)
    where
        M: MixerPort + ?Sized,
        A: MixerPort + ?Sized,
    {
        trace!(
            "unit {:?} clip {} weight {}",
            self.id,
            self.animation_index,
            self.weight
        );
        mixer.set_input_weight(self.animation_index, self.weight);
        if let Some(a) = self.audio_index {
            audio.set_input_weight(a, self.weight);
        }
    }

    // --- accessors -----------------------------------------------------

    #[inline]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[inline]
    pub fn animation_index(&self) -> usize {
        self.animation_index
    }

    #[inline]
    pub fn audio_index(&self) -> Option<usize> {
        self.audio_index
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    #[inline]
    pub fn start_blend_time(&self) -> f32 {
        self.start_blend_time
    }

    #[inline]
    pub fn end_blend_time(&self) -> f32 {
        self.end_blend_time
    }

    #[inline]
    pub fn processing_time(&self) -> f32 {
        self.processing_time
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    #[inline]
    pub fn can_start_next(&self) -> bool {
        self.can_start_next
    }

    #[inline]
    pub fn status(&self) -> UnitStatus {
        self.status
    }
}
