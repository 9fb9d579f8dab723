//! Audio capture.
//!
//! The controller records annotations through the [`CaptureDevice`] trait;
//! [`microphone::Microphone`] is the real implementation. The capture
//! stream runs for the lifetime of the device so the level monitor stays
//! live between recordings.

pub mod microphone;

use crate::error::NarratorError;
use std::path::Path;

/// An enumerated input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Index within the host's input device list.
    pub id: usize,
    pub name: String,
}

/// A device that can record an audio clip to a file on demand.
pub trait CaptureDevice {
    /// Begin writing captured audio to `output`. Fails with
    /// `DeviceUnavailable` if the device cannot deliver samples and with
    /// `InvalidState` if a recording is already in progress.
    fn begin_recording(&mut self, output: &Path) -> Result<(), NarratorError>;

    /// Stop the in-progress recording and finalize the file. A no-op when
    /// nothing is recording.
    fn end_recording(&mut self) -> Result<(), NarratorError>;

    fn is_capturing(&self) -> bool;
}
