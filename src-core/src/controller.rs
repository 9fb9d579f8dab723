//! Playback and recording state machine.
//!
//! Owns the player, the capture device, the per-video recording store and
//! the marker board, and enforces which operations are legal in which
//! state. The host UI forwards button presses and timer ticks here and
//! renders whatever the controller exposes.
//!
//! State rules, in short: recording always happens over a paused video
//! (starting a recording pauses playback first), and while a recording is
//! in flight every transport control is refused except stopping the
//! recording or deleting it. Held seeking is a transient modifier over
//! `Paused` or `Playing`, tracked by the repeater rather than as a state.

use crate::annotations;
use crate::capture::CaptureDevice;
use crate::error::NarratorError;
use crate::markers::MarkerBoard;
use crate::player::{poll_duration, DurationPoll, Player};
use crate::seek::{SeekDirection, SeekRepeater};
use crate::store::TimestampStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current mode of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded; only `load_video` is legal.
    NoVideo,
    Paused,
    Playing,
    /// An annotation is being captured. Video is paused and muted.
    Recording,
}

/// Drives a [`Player`] and a [`CaptureDevice`] according to user commands.
pub struct PlaybackController<P: Player, C: CaptureDevice> {
    player: P,
    capture: C,
    state: PlaybackState,
    output_root: PathBuf,
    video_path: Option<PathBuf>,
    duration_ms: Option<u64>,
    store: Option<TimestampStore>,
    markers: MarkerBoard,
    seek: SeekRepeater,
    rate: f64,
    muted: bool,
    /// Timestamp of the in-flight recording while in `Recording`.
    active_recording: Option<u64>,
    end_reached: bool,
}

impl<P: Player, C: CaptureDevice> PlaybackController<P, C> {
    pub fn new(player: P, capture: C, output_root: PathBuf, seek_step_ms: u64) -> Self {
        Self {
            player,
            capture,
            state: PlaybackState::NoVideo,
            output_root,
            video_path: None,
            duration_ms: None,
            store: None,
            markers: MarkerBoard::new(),
            seek: SeekRepeater::new(seek_step_ms),
            rate: crate::DEFAULT_PLAYBACK_RATE,
            muted: true,
            active_recording: None,
            end_reached: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn position_ms(&self) -> u64 {
        self.player.position_ms()
    }

    /// Cached media duration, once known.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn markers(&self) -> &MarkerBoard {
        &self.markers
    }

    /// Recording timestamps for the loaded video, ascending.
    pub fn recording_times(&self) -> Vec<u64> {
        self.store.as_ref().map(|s| s.times()).unwrap_or_default()
    }

    /// Clip file for the recording at `timestamp_ms`, for replay.
    pub fn clip_path(&self, timestamp_ms: u64) -> Option<&Path> {
        self.store.as_ref().and_then(|s| s.clip_path(timestamp_ms))
    }

    /// Timestamp of the recording currently being captured.
    pub fn recording_timestamp(&self) -> Option<u64> {
        self.active_recording
    }

    /// Direction of the held seek, if a seek button is down.
    pub fn seeking(&self) -> Option<SeekDirection> {
        self.seek.direction()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Load a video, replacing the current one. Hydrates any persisted
    /// annotation set for it, rebuilds the markers, mutes the video audio
    /// and resets the playback rate to normal. Leaves the video paused;
    /// the duration is not known yet and is polled via
    /// [`Self::poll_duration_tick`].
    ///
    /// Refused while a recording is in flight. Recordings never leak
    /// between videos: the previous store is dropped wholesale.
    pub fn load_video(&mut self, video: &Path) -> Result<(), NarratorError> {
        if self.state == PlaybackState::Recording {
            return Err(NarratorError::InvalidState(
                "cannot load a video while recording".to_string(),
            ));
        }

        self.player.load(video)?;

        let clips_dir = annotations::folder_for(&self.output_root, video);
        let store = if TimestampStore::exists(&clips_dir) {
            TimestampStore::load(clips_dir)?
        } else {
            TimestampStore::new(clips_dir)
        };
        info!(
            "Loaded {:?} with {} existing annotations",
            video,
            store.len()
        );

        self.markers.sync(&store.times());
        self.store = Some(store);
        self.video_path = Some(video.to_path_buf());
        self.duration_ms = None;
        self.end_reached = false;
        self.seek.stop();

        self.rate = crate::DEFAULT_PLAYBACK_RATE;
        self.player.set_rate(self.rate);
        self.muted = true;
        self.player.set_muted(true);

        self.state = PlaybackState::Paused;
        Ok(())
    }

    /// Duration probe, driven by the host every
    /// [`crate::DURATION_POLL_INTERVAL_MS`] after a load until it returns
    /// `Ready`.
    pub fn poll_duration_tick(&mut self) -> DurationPoll {
        if let Some(ms) = self.duration_ms {
            return DurationPoll::Ready(ms);
        }
        match poll_duration(&self.player) {
            DurationPoll::Ready(ms) => {
                debug!("Media duration known: {} ms", ms);
                self.duration_ms = Some(ms);
                DurationPoll::Ready(ms)
            }
            DurationPoll::Pending => DurationPoll::Pending,
        }
    }

    /// Toggle between `Playing` and `Paused`.
    pub fn play_pause(&mut self) -> Result<(), NarratorError> {
        match self.state {
            PlaybackState::Playing => {
                self.player.pause();
                self.state = PlaybackState::Paused;
                Ok(())
            }
            PlaybackState::Paused => {
                self.player.play();
                self.state = PlaybackState::Playing;
                Ok(())
            }
            PlaybackState::NoVideo => Err(NarratorError::InvalidState(
                "no video loaded".to_string(),
            )),
            PlaybackState::Recording => Err(NarratorError::InvalidState(
                "playback is locked while recording".to_string(),
            )),
        }
    }

    /// Toggle the video's own audio track.
    pub fn toggle_mute(&mut self) -> Result<bool, NarratorError> {
        if self.state == PlaybackState::NoVideo {
            return Err(NarratorError::InvalidState(
                "no video loaded".to_string(),
            ));
        }
        self.muted = !self.muted;
        self.player.set_muted(self.muted);
        Ok(self.muted)
    }

    /// Select a playback rate. Only the preset rates are accepted. Before
    /// a video is loaded the selection is remembered but not applied; it
    /// resets to normal speed on every load.
    pub fn set_rate(&mut self, rate: f64) -> Result<(), NarratorError> {
        if !crate::player::is_supported_rate(rate) {
            return Err(NarratorError::InvalidState(format!(
                "unsupported playback rate {}",
                rate
            )));
        }
        self.rate = rate;
        if self.state != PlaybackState::NoVideo {
            self.player.set_rate(rate);
        }
        Ok(())
    }

    /// Jump to an absolute position, e.g. from a slider release or a
    /// marker click. Clamped to the known duration. Does not echo back a
    /// position-changed notification; the player reports the move itself.
    pub fn seek_to(&mut self, position_ms: u64) -> Result<(), NarratorError> {
        self.require_transport("seeking")?;
        let target = match self.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
        self.player.set_position_ms(target);
        Ok(())
    }

    /// Begin a held seek; the first step lands on the next repeat tick.
    pub fn seek_pressed(&mut self, direction: SeekDirection) -> Result<(), NarratorError> {
        self.require_transport("seeking")?;
        self.seek.start(direction);
        Ok(())
    }

    /// One repeat step, driven by the host every
    /// [`crate::SEEK_REPEAT_INTERVAL_MS`] while a seek button is held.
    pub fn seek_tick(&mut self) {
        let duration = self.duration_ms.unwrap_or(0);
        if let Some(target) = self.seek.tick(self.player.position_ms(), duration) {
            self.player.set_position_ms(target);
        }
    }

    /// End a held seek.
    pub fn seek_released(&mut self) {
        self.seek.stop();
    }

    /// Record-button handler: starts a recording, or finishes the one in
    /// flight.
    pub fn toggle_record(&mut self) -> Result<(), NarratorError> {
        if self.state == PlaybackState::Recording {
            self.stop_recording()
        } else {
            self.start_recording().map(|_| ())
        }
    }

    /// Start capturing an annotation at the current playhead. Playback is
    /// paused first so the narration lines up with a single frame.
    ///
    /// Returns the annotation timestamp. If the capture device fails, the
    /// store entry is rolled back and no state bit is left claiming an
    /// active capture.
    pub fn start_recording(&mut self) -> Result<u64, NarratorError> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Paused => {}
            PlaybackState::NoVideo => {
                return Err(NarratorError::InvalidState(
                    "no video loaded".to_string(),
                ))
            }
            PlaybackState::Recording => {
                return Err(NarratorError::InvalidState(
                    "recording already in progress".to_string(),
                ))
            }
        }

        if self.state == PlaybackState::Playing {
            self.player.pause();
            self.state = PlaybackState::Paused;
        }

        let timestamp = self.player.position_ms();
        let store = self.store_mut()?;
        let clip = store.add(timestamp)?.audio_path.clone();

        if let Err(e) = self.capture.begin_recording(&clip) {
            // The entry was never recorded into; take it back out.
            if let Some(store) = self.store.as_mut() {
                let _ = store.delete(timestamp);
            }
            return Err(e);
        }

        self.markers.sync(&self.recording_times());
        self.active_recording = Some(timestamp);
        self.state = PlaybackState::Recording;
        info!("Recording annotation at {} ms", timestamp);
        Ok(timestamp)
    }

    /// Finish the in-flight recording and resume playback. Playback
    /// resumes even when the recording was started from a paused video.
    pub fn stop_recording(&mut self) -> Result<(), NarratorError> {
        if self.state != PlaybackState::Recording {
            return Err(NarratorError::InvalidState(
                "no recording in progress".to_string(),
            ));
        }

        self.capture.end_recording()?;
        self.active_recording = None;
        self.player.play();
        self.state = PlaybackState::Playing;
        debug!("Recording stopped, playback resumed");
        Ok(())
    }

    /// Delete the recording at `timestamp_ms`, removing its clip file.
    /// Playback is paused for the removal and resumed if it was playing.
    ///
    /// When a recording is in flight, capture stops first and the video
    /// stays paused rather than resuming (so playback does not run over a
    /// just-deleted region); the in-flight entry survives unless it is the
    /// one targeted.
    pub fn delete_recording(&mut self, timestamp_ms: u64) -> Result<(), NarratorError> {
        if self.state == PlaybackState::Recording {
            self.capture.end_recording()?;
            self.active_recording = None;
            self.state = PlaybackState::Paused;

            let removed = self.store_mut()?.delete(timestamp_ms)?;
            annotations::remove_clip(&removed.audio_path)?;
            self.markers.sync(&self.recording_times());
            info!(
                "Deleted recording at {} ms (capture stopped, no resume)",
                timestamp_ms
            );
            return Ok(());
        }

        let was_playing = self.state == PlaybackState::Playing;
        if was_playing {
            self.player.pause();
            self.state = PlaybackState::Paused;
        }

        let removed = self.store_mut()?.delete(timestamp_ms)?;
        annotations::remove_clip(&removed.audio_path)?;
        self.markers.sync(&self.recording_times());
        info!("Deleted recording at {} ms", timestamp_ms);

        if was_playing {
            self.player.play();
            self.state = PlaybackState::Playing;
        }
        Ok(())
    }

    /// Delete the most recent recording.
    ///
    /// When a recording is in flight the most recent entry is the one
    /// being captured, so this abandons it: capture stops and the video
    /// stays paused per [`Self::delete_recording`].
    pub fn delete_last(&mut self) -> Result<u64, NarratorError> {
        let last = self
            .store
            .as_ref()
            .ok_or_else(|| NarratorError::InvalidState("no video loaded".to_string()))?
            .last_time()
            .ok_or(NarratorError::EmptyStore)?;
        self.delete_recording(last)?;
        Ok(last)
    }

    /// Swap the capture device, e.g. after the user picks a different
    /// microphone. The caller opens the new device first, so an open
    /// failure never reaches the controller and the previous device stays
    /// selected. Refused while a recording is in flight.
    pub fn replace_capture(&mut self, capture: C) -> Result<(), NarratorError> {
        if self.state == PlaybackState::Recording {
            return Err(NarratorError::InvalidState(
                "cannot switch devices while recording".to_string(),
            ));
        }
        self.capture = capture;
        info!("Capture device replaced");
        Ok(())
    }

    /// End-of-media notification from the player backend. The actual
    /// reload is deferred; the host schedules
    /// [`Self::finish_end_reached`] after
    /// [`crate::END_REACHED_RELOAD_DELAY_MS`]. Reloading from inside the
    /// notification stalls some backends.
    pub fn handle_end_reached(&mut self) {
        if self.state == PlaybackState::Playing {
            self.end_reached = true;
            self.seek.stop();
        }
    }

    /// Reload the media after end-of-media so the video can be replayed.
    /// Leaves the playhead at the start, paused. No-op unless an
    /// end-of-media notification is pending; a repeat notification does
    /// not queue a second reload.
    pub fn finish_end_reached(&mut self) -> Result<(), NarratorError> {
        if !self.end_reached {
            return Ok(());
        }
        self.end_reached = false;

        let video = self
            .video_path
            .clone()
            .ok_or_else(|| NarratorError::InvalidState("no video loaded".to_string()))?;
        self.player.load(&video)?;
        self.player.set_rate(self.rate);
        self.player.set_muted(self.muted);
        // The valid position range starts at 1, not 0.
        self.player.set_position_ms(1);
        self.player.pause();
        self.state = PlaybackState::Paused;
        debug!("Reloaded {:?} after end of media", video);
        Ok(())
    }

    fn store_mut(&mut self) -> Result<&mut TimestampStore, NarratorError> {
        self.store
            .as_mut()
            .ok_or_else(|| NarratorError::InvalidState("no video loaded".to_string()))
    }

    fn require_transport(&self, what: &str) -> Result<(), NarratorError> {
        match self.state {
            PlaybackState::NoVideo => Err(NarratorError::InvalidState(
                "no video loaded".to_string(),
            )),
            PlaybackState::Recording => Err(NarratorError::InvalidState(format!(
                "{} is locked while recording",
                what
            ))),
            _ => Ok(()),
        }
    }
}
