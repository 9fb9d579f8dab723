//! Abstraction over the media backend.
//!
//! The controller never talks to a concrete video backend directly; it
//! drives whatever implements [`Player`]. The host application supplies the
//! real backend, tests supply a scripted one.

use crate::error::NarratorError;
use std::path::Path;

/// Minimal surface the playback controller needs from a media backend.
pub trait Player {
    /// Load a media file, replacing any currently loaded one. Does not
    /// start playback.
    fn load(&mut self, media: &Path) -> Result<(), NarratorError>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Jump the playhead. Positions beyond the media end are clamped by
    /// the backend.
    fn set_position_ms(&mut self, position_ms: u64);

    fn position_ms(&self) -> u64;

    /// Media duration, once the backend has parsed enough to know it.
    /// Backends commonly return nothing until playback has started.
    fn duration_ms(&self) -> Option<u64>;

    fn set_rate(&mut self, rate: f64);

    /// Mute or unmute the video's own audio track. The video is muted
    /// while annotations are recorded or replayed.
    fn set_muted(&mut self, muted: bool);
}

/// Result of one duration probe.
///
/// After a load the duration is polled on a short timer until the backend
/// reports it; only then can seek targets be clamped and marker fractions
/// computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPoll {
    /// The backend does not know the duration yet; poll again.
    Pending,
    /// Duration in milliseconds.
    Ready(u64),
}

/// Probe `player` for the media duration.
pub fn poll_duration<P: Player>(player: &P) -> DurationPoll {
    match player.duration_ms() {
        Some(ms) if ms > 0 => DurationPoll::Ready(ms),
        _ => DurationPoll::Pending,
    }
}

/// Whether `rate` is one of the selectable playback rates.
pub fn is_supported_rate(rate: f64) -> bool {
    crate::PLAYBACK_RATES.contains(&rate)
}
