//! Microphone capture through cpal.
//!
//! One input stream is opened when the device is selected and stays running
//! until the device is dropped or swapped. Every callback chunk is pushed
//! to the level monitor; while a recording is active the same chunk is also
//! appended to the open WAV writer. The callback runs on the audio thread,
//! so it never blocks on I/O other than the buffered WAV write.

use super::{CaptureDevice, DeviceInfo};
use crate::error::NarratorError;
use crate::monitor::MonitorFeed;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use hound::WavWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

/// Enumerate the host's input devices.
pub fn list_devices() -> Result<Vec<DeviceInfo>, NarratorError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| NarratorError::DeviceUnavailable(e.to_string()))?;

    Ok(devices
        .enumerate()
        .map(|(id, device)| DeviceInfo {
            id,
            name: device
                .name()
                .unwrap_or_else(|_| format!("Input device {}", id)),
        })
        .collect())
}

/// WAV header for the capture stream. Clips are stored as 32-bit float,
/// matching the sample format the callback normalizes to.
fn wav_spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// A live microphone stream that can record clips on demand.
pub struct Microphone {
    _stream: cpal::Stream,
    writer: SharedWriter,
    channels: u16,
    sample_rate: u32,
    capturing: bool,
}

impl Microphone {
    /// Open the input device at `device_id` and start its stream, feeding
    /// the level monitor. Falls back to the default input device when the
    /// index is out of range (the configured device may have been
    /// unplugged).
    pub fn open(device_id: usize, feed: MonitorFeed) -> Result<Self, NarratorError> {
        let host = cpal::default_host();

        let device = host
            .input_devices()
            .map_err(|e| NarratorError::DeviceUnavailable(e.to_string()))?
            .nth(device_id)
            .or_else(|| {
                warn!("Input device {} not found, using default", device_id);
                host.default_input_device()
            })
            .ok_or_else(|| {
                NarratorError::DeviceUnavailable("No input device available".to_string())
            })?;

        let supported = device
            .default_input_config()
            .map_err(|e| NarratorError::DeviceUnavailable(e.to_string()))?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels;
        let sample_rate = config.sample_rate.0;

        info!(
            "Opening input device {:?} ({} ch @ {} Hz, {:?})",
            device.name().unwrap_or_default(),
            channels,
            sample_rate,
            sample_format
        );

        let writer: SharedWriter = Arc::new(Mutex::new(None));
        let stream = build_stream(&device, &config, sample_format, feed, Arc::clone(&writer))?;
        stream
            .play()
            .map_err(|e| NarratorError::DeviceUnavailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            writer,
            channels,
            sample_rate,
            capturing: false,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl CaptureDevice for Microphone {
    fn begin_recording(&mut self, output: &Path) -> Result<(), NarratorError> {
        if self.capturing {
            return Err(NarratorError::InvalidState(
                "recording already in progress".to_string(),
            ));
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let wav = WavWriter::create(output, wav_spec(self.channels, self.sample_rate))
            .map_err(|e| NarratorError::Storage(e.to_string()))?;

        match self.writer.lock() {
            Ok(mut guard) => *guard = Some(wav),
            Err(_) => {
                return Err(NarratorError::DeviceUnavailable(
                    "capture thread panicked".to_string(),
                ))
            }
        }

        self.capturing = true;
        debug!("Recording to {:?}", output);
        Ok(())
    }

    fn end_recording(&mut self) -> Result<(), NarratorError> {
        if !self.capturing {
            return Ok(());
        }
        self.capturing = false;

        let wav = match self.writer.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                return Err(NarratorError::DeviceUnavailable(
                    "capture thread panicked".to_string(),
                ))
            }
        };

        if let Some(wav) = wav {
            wav.finalize()
                .map_err(|e| NarratorError::Storage(e.to_string()))?;
        }
        debug!("Recording stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: SampleFormat,
    feed: MonitorFeed,
    writer: SharedWriter,
) -> Result<cpal::Stream, NarratorError> {
    let err_fn = |e| error!("Input stream error: {}", e);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &_| on_samples(data.to_vec(), &feed, &writer),
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &_| {
                let samples = data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                on_samples(samples, &feed, &writer)
            },
            err_fn,
            None,
        ),
        SampleFormat::I32 => device.build_input_stream(
            config,
            move |data: &[i32], _: &_| {
                let samples = data.iter().map(|&s| s as f32 / i32::MAX as f32).collect();
                on_samples(samples, &feed, &writer)
            },
            err_fn,
            None,
        ),
        SampleFormat::I8 => device.build_input_stream(
            config,
            move |data: &[i8], _: &_| {
                let samples = data.iter().map(|&s| s as f32 / i8::MAX as f32).collect();
                on_samples(samples, &feed, &writer)
            },
            err_fn,
            None,
        ),
        other => {
            return Err(NarratorError::DeviceUnavailable(format!(
                "Unsupported sample format: {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| NarratorError::DeviceUnavailable(e.to_string()))
}

/// Audio-thread chunk handler. The monitor copy goes through a bounded
/// try_send; the WAV write goes through a BufWriter.
fn on_samples(samples: Vec<f32>, feed: &MonitorFeed, writer: &SharedWriter) {
    if let Ok(mut guard) = writer.lock() {
        if let Some(wav) = guard.as_mut() {
            for &sample in &samples {
                if let Err(e) = wav.write_sample(sample) {
                    error!("Failed to write sample: {}", e);
                    break;
                }
            }
        }
    }
    feed.push(samples);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_spec_is_float32() {
        let spec = wav_spec(2, 44_100);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    }
}
