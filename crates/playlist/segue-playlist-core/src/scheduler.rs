//! Playback scheduler: an ordered queue of blend units.
//!
//! The queue is the only source of truth: index 0 is the unit currently
//! playing, index 1 the one that blends in once the head starts fading out.
//! At most these two units are advanced per tick.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::blend::{check_clip_index, BlendUnit, UnitStatus};
use crate::config::Config;
use crate::ids::{IdAllocator, UnitId};
use crate::mixer::{ClipMixer, MixerPort, NoAudio};
use crate::outputs::{Outputs, PlaylistEvent, WeightChange};
use crate::request::ClipRequest;
use crate::Result;

/// Drives a queue of [`BlendUnit`]s against an animation mixer and an
/// optional audio mixer.
#[derive(Debug)]
pub struct PlaybackScheduler<M, A = NoAudio> {
    cfg: Config,
    ids: IdAllocator,
    mixer: M,
    audio: A,
    queue: VecDeque<BlendUnit>,
    // Per-tick outputs
    outputs: Outputs,
    // Produced by append/clear between ticks; surfaced by the next tick.
    carry: Outputs,
}

impl<M: ClipMixer> PlaybackScheduler<M, NoAudio> {
    /// Scheduler without an audio mixer.
    pub fn new(cfg: Config, mixer: M) -> Self {
        Self::with_audio(cfg, mixer, NoAudio)
    }
}

impl<M: ClipMixer, A: MixerPort> PlaybackScheduler<M, A> {
    /// Scheduler whose units mirror their weight onto `audio`.
    pub fn with_audio(cfg: Config, mixer: M, audio: A) -> Self {
        let cfg = cfg.sanitized();
        Self {
            queue: VecDeque::with_capacity(cfg.initial_queue_capacity),
            cfg,
            ids: IdAllocator::new(),
            mixer,
            audio,
            outputs: Outputs::default(),
            carry: Outputs::default(),
        }
    }

    /// Enqueue clips by index, with an optional parallel list of audio
    /// indices (negative or missing entries mean no audio).
    ///
    /// With `queued == false` everything behind the head is dropped first.
    pub fn append(
        &mut self,
        animations: &[usize],
        audios: Option<&[i32]>,
        queued: bool,
    ) -> Result<Vec<UnitId>> {
        self.append_requests(ClipRequest::pair(animations, audios), queued)
    }

    /// Enqueue clip requests and return the ids of the created units.
    ///
    /// Every animation index is validated before the queue is touched, so an
    /// `InvalidClipIndex` error leaves the playlist exactly as it was.
    pub fn append_requests<I>(&mut self, requests: I, queued: bool) -> Result<Vec<UnitId>>
    where
        I: IntoIterator<Item = ClipRequest>,
    {
        let requests: Vec<ClipRequest> = requests.into_iter().collect();
        let input_count = self.mixer.input_count();
        for req in &requests {
            check_clip_index(req.animation, input_count)?;
        }

        if !queued {
            self.truncate_to_head();
        }
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        // The previous tail now has a successor to fade into.
        if let Some(tail) = self.queue.back_mut() {
            tail.auto_end_blend(&self.cfg);
        }

        let last = requests.len() - 1;
        let mut created = Vec::with_capacity(requests.len());
        for (i, req) in requests.into_iter().enumerate() {
            let id = self.ids.alloc_unit();
            let mut unit =
                BlendUnit::new(id, &mut self.mixer, &self.audio, req.animation, req.audio)?;
            unit.set_speed(req.speed);
            if !self.queue.is_empty() {
                unit.auto_start_blend(&self.cfg);
            }
            if i != last {
                unit.auto_end_blend(&self.cfg);
            }
            debug!(
                "queued unit {:?}: clip {} audio {:?} at position {}",
                id,
                req.animation,
                unit.audio_index(),
                self.queue.len()
            );
            created.push(id);
            self.queue.push_back(unit);
        }
        Ok(created)
    }

    /// Advance the playlist by `dt` seconds.
    ///
    /// Drives the head through Pending → Processing → Done, retires or loops it
    /// once done, and drives the next unit while the head is fading out.
    pub fn tick(&mut self, dt: f32) -> &Outputs {
        let cap = self.cfg.max_events_per_tick;
        self.outputs.clear();
        for event in self.carry.events.drain(..) {
            self.outputs.push_event(event, cap);
        }
        self.outputs.dropped_events += std::mem::take(&mut self.carry.dropped_events);
        self.outputs.changes.append(&mut self.carry.changes);

        if self.queue.is_empty() || self.mixer.input_count() == 0 {
            self.report_dropped();
            return &self.outputs;
        }

        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("ignoring invalid frame delta {}", dt);
            0.0
        };

        let Self {
            queue,
            mixer,
            audio,
            outputs,
            ..
        } = &mut *self;

        let head_was_done = queue[0].status() == UnitStatus::Done;
        let head_can_start_next;
        {
            let head = &mut queue[0];
            if !head_was_done {
                drive(head, dt, mixer, audio, outputs, cap);
            }
            head_can_start_next = head.can_start_next();
        }

        // Index of the unit that was second when this tick began.
        let mut next_index = 1;
        if head_was_done {
            if queue.len() == 1 {
                let head = &mut queue[0];
                head.reset();
                debug!("looping sole unit {:?}", head.id());
                outputs.push_event(PlaylistEvent::UnitLooped { unit: head.id() }, cap);
            } else if let Some(retired) = queue.pop_front() {
                debug!(
                    "retired unit {:?}; {} unit(s) remain",
                    retired.id(),
                    queue.len()
                );
                outputs.push_event(PlaylistEvent::UnitRetired { unit: retired.id() }, cap);
                next_index = 0;
            }
        }

        if head_can_start_next {
            if let Some(next) = queue.get_mut(next_index) {
                // A successor already done is left for retirement.
                if next.status() != UnitStatus::Done {
                    drive(next, dt, mixer, audio, outputs, cap);
                }
            }
        }

        self.report_dropped();
        &self.outputs
    }

    /// Drop every unit. Units that already started are silenced first.
    pub fn clear(&mut self) {
        let cap = self.cfg.max_events_per_tick;
        for unit in self.queue.drain(..) {
            discard(unit, &mut self.mixer, &mut self.audio, &mut self.carry, cap);
        }
    }

    fn truncate_to_head(&mut self) {
        if self.queue.len() < 2 {
            return;
        }
        debug!("dropping {} unit(s) behind the head", self.queue.len() - 1);
        let cap = self.cfg.max_events_per_tick;
        for unit in self.queue.drain(1..) {
            discard(unit, &mut self.mixer, &mut self.audio, &mut self.carry, cap);
        }
    }

    fn report_dropped(&self) {
        if self.outputs.dropped_events > 0 {
            warn!(
                "dropped {} playlist event(s) over the per-tick cap of {}",
                self.outputs.dropped_events, self.cfg.max_events_per_tick
            );
        }
    }

    // --- accessors -----------------------------------------------------

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Unit currently playing.
    pub fn head(&self) -> Option<&BlendUnit> {
        self.queue.front()
    }

    /// Unit that blends in when the head starts fading out.
    pub fn upcoming(&self) -> Option<&BlendUnit> {
        self.queue.get(1)
    }

    /// Units in playback order.
    pub fn units(&self) -> impl Iterator<Item = &BlendUnit> {
        self.queue.iter()
    }

    pub fn unit(&self, id: UnitId) -> Option<&BlendUnit> {
        self.queue.iter().find(|u| u.id() == id)
    }

    /// Mutable access for per-unit configuration (speed, explicit blend
    /// windows) before the unit starts.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut BlendUnit> {
        self.queue.iter_mut().find(|u| u.id() == id)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Outputs of the last tick.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn animation_mixer(&self) -> &M {
        &self.mixer
    }

    pub fn animation_mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    pub fn audio_mixer(&self) -> &A {
        &self.audio
    }

    pub fn audio_mixer_mut(&mut self) -> &mut A {
        &mut self.audio
    }
}

/// Advance one unit according to its status and record what happened.
fn drive<M, A>(
    unit: &mut BlendUnit,
    dt: f32,
    mixer: &mut M,
    audio: &mut A,
    outputs: &mut Outputs,
    cap: usize,
) where
    M: ClipMixer + ?Sized,
    A: MixerPort + ?Sized,
{
    match unit.status() {
        UnitStatus::Pending => {
            if unit.start(mixer) {
                outputs.push_event(
                    PlaylistEvent::UnitStarted {
                        unit: unit.id(),
                        animation: unit.animation_index(),
                    },
                    cap,
                );
            }
        }
        UnitStatus::Processing => {
            let report = unit.tick(dt, mixer, audio);
            if report.ticked {
                outputs.push_change(change_of(unit));
            }
            if report.handoff_ready {
                outputs.push_event(PlaylistEvent::HandoffReady { unit: unit.id() }, cap);
            }
            if report.finished {
                outputs.push_event(PlaylistEvent::UnitFinished { unit: unit.id() }, cap);
            }
        }
        UnitStatus::Done => {}
    }
}

/// Silence a removed unit if it started, and queue the event for the next tick.
/// Overflow past `cap` is counted in the carry and reported by that tick.
fn discard<M, A>(
    mut unit: BlendUnit,
    mixer: &mut M,
    audio: &mut A,
    carry: &mut Outputs,
    cap: usize,
) where
    M: MixerPort + ?Sized,
    A: MixerPort + ?Sized,
{
    if unit.status().has_started() {
        unit.silence(mixer, audio);
        carry.push_change(change_of(&unit));
    }
    debug!("discarded unit {:?} (clip {})", unit.id(), unit.animation_index());
    carry.push_event(PlaylistEvent::UnitDiscarded { unit: unit.id() }, cap);
}

fn change_of(unit: &BlendUnit) -> WeightChange {
    WeightChange {
        unit: unit.id(),
        animation: unit.animation_index(),
        audio: unit.audio_index(),
        weight: unit.weight(),
    }
}
