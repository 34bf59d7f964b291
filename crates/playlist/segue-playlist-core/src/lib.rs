//! Segue Playlist Core (engine-agnostic)
//!
//! Crossfade scheduling for a queue of animation clips (with optional paired
//! audio) on an external mixer. The host owns the mixing graph and exposes it
//! through the [`MixerPort`]/[`ClipSource`] traits; this crate only decides,
//! frame by frame, which clips are active and how much weight each one gets.
//!
//! - [`BlendUnit`]: per-clip weight state machine (fade-in, steady, fade-out).
//! - [`PlaybackScheduler`]: ordered queue that drives at most two units per tick.

pub mod blend;
pub mod config;
pub mod error;
pub mod ids;
pub mod mixer;
pub mod outputs;
pub mod request;
pub mod scheduler;

// Re-exports for consumers (host adapters)
pub use blend::{BlendUnit, BlendWindow, TickReport, UnitCfg, UnitStatus};
pub use config::Config;
pub use error::PlaylistError;
pub use ids::{IdAllocator, UnitId};
pub use mixer::{ClipMixer, ClipSource, MemoryMixer, MixerPort, NoAudio};
pub use outputs::{Outputs, PlaylistEvent, WeightChange};
pub use request::ClipRequest;
pub use scheduler::PlaybackScheduler;

/// Playlist result type
pub type Result<T> = core::result::Result<T, PlaylistError>;
