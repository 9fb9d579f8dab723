//! Core of Narrator, a tool for voicing annotations over a video.
//!
//! The GUI lives in a separate crate; everything here is UI-agnostic. The
//! host supplies a [`player::Player`] backend and drives the timers
//! ([`SEEK_REPEAT_INTERVAL_MS`], [`DURATION_POLL_INTERVAL_MS`],
//! [`MONITOR_INTERVAL_MS`]); the [`controller::PlaybackController`] owns
//! all state.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod markers;
pub mod monitor;
pub mod player;
pub mod seek;
pub mod store;
pub mod timecode;

pub use capture::{CaptureDevice, DeviceInfo};
pub use controller::{PlaybackController, PlaybackState};
pub use error::NarratorError;
pub use monitor::{monitor_channel, AudioMonitor, MonitorBuffer, MonitorDrain, MonitorFeed, MonitorFrame};
pub use player::{DurationPoll, Player};
pub use seek::{SeekDirection, SeekRepeater};
pub use store::{Recording, TimestampStore};

/// Step applied per seek repeat, in milliseconds.
pub const SEEK_STEP_MS: u64 = 500;

/// Interval of the host timer that repeats a held seek.
pub const SEEK_REPEAT_INTERVAL_MS: u64 = 50;

/// Interval of the duration probe after a load, until the backend reports
/// the media length.
pub const DURATION_POLL_INTERVAL_MS: u64 = 50;

/// Delay before the media is reloaded after end-of-media. Reloading from
/// inside the end-of-media callback stalls some backends.
pub const END_REACHED_RELOAD_DELAY_MS: u64 = 100;

/// Selectable playback rates. The selection resets to normal speed on
/// every load.
pub const PLAYBACK_RATES: [f64; 5] = [0.50, 0.75, 1.00, 1.50, 2.00];

/// Rate applied when a video is loaded.
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Samples per channel shown by the level monitor.
pub const MONITOR_WINDOW_SAMPLES: usize = 200;

/// Refresh interval of the level monitor plot.
pub const MONITOR_INTERVAL_MS: u64 = 30;

/// Capacity of the capture-to-monitor chunk queue. Chunks beyond this are
/// dropped rather than blocking the audio thread.
pub const MONITOR_QUEUE_CHUNKS: usize = 64;
