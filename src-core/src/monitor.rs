//! Microphone level monitor.
//!
//! The capture callback runs on a realtime audio thread and must never
//! block, so samples are handed to the UI side through a bounded channel:
//! the producer drops chunks when the queue is full, and the UI tick drains
//! everything pending into a fixed-size per-channel window for plotting.

use tokio::sync::mpsc;
use tracing::trace;

/// Fixed-size sample window per channel, oldest sample first.
///
/// Starts zero-filled so the plot renders a flat line before any audio
/// arrives. Pushing shifts existing samples left and appends at the end.
pub struct MonitorBuffer {
    channels: usize,
    window: usize,
    data: Vec<Vec<f32>>,
}

impl MonitorBuffer {
    pub fn new(channels: usize, window: usize) -> Self {
        let channels = channels.max(1);
        Self {
            channels,
            window,
            data: vec![vec![0.0; window]; channels],
        }
    }

    /// Append interleaved frames. Input longer than the window keeps only
    /// the trailing `window` frames.
    pub fn push_frames(&mut self, interleaved: &[f32]) {
        if self.window == 0 || interleaved.is_empty() {
            return;
        }

        let frames = interleaved.len() / self.channels;
        let keep = frames.min(self.window);
        let skip = frames - keep;

        for (ch, channel_data) in self.data.iter_mut().enumerate() {
            if keep == self.window {
                channel_data.clear();
            } else {
                channel_data.drain(..keep);
            }
            channel_data.extend(
                interleaved[skip * self.channels..]
                    .iter()
                    .skip(ch)
                    .step_by(self.channels)
                    .take(keep),
            );
        }
    }

    /// Samples for one channel, oldest first. Always `window` long.
    pub fn channel(&self, idx: usize) -> &[f32] {
        &self.data[idx]
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Zero the window, e.g. when the capture device changes.
    pub fn reset(&mut self) {
        for channel_data in &mut self.data {
            channel_data.iter_mut().for_each(|s| *s = 0.0);
        }
    }
}

/// Producer half of the monitor hand-off, held by the capture callback.
#[derive(Clone)]
pub struct MonitorFeed {
    tx: mpsc::Sender<Vec<f32>>,
}

impl MonitorFeed {
    /// Queue a chunk of interleaved samples without blocking. Chunks are
    /// silently dropped when the UI falls behind; the monitor is a level
    /// display, not a recording path.
    pub fn push(&self, chunk: Vec<f32>) {
        if let Err(e) = self.tx.try_send(chunk) {
            trace!("Monitor chunk dropped: {}", e);
        }
    }
}

/// Consumer half of the monitor hand-off, drained from the UI tick.
pub struct MonitorDrain {
    rx: mpsc::Receiver<Vec<f32>>,
}

impl MonitorDrain {
    /// Move every pending chunk into `buffer`. Returns the number of chunks
    /// consumed so the caller can skip a redraw when nothing arrived.
    pub fn drain_into(&mut self, buffer: &mut MonitorBuffer) -> usize {
        let mut consumed = 0;
        while let Ok(chunk) = self.rx.try_recv() {
            buffer.push_frames(&chunk);
            consumed += 1;
        }
        consumed
    }
}

/// Create a bounded feed/drain pair for the monitor.
pub fn monitor_channel(capacity: usize) -> (MonitorFeed, MonitorDrain) {
    let (tx, rx) = mpsc::channel(capacity);
    (MonitorFeed { tx }, MonitorDrain { rx })
}

/// One rendered monitor frame: the sample window per channel plus the
/// visual treatment flag.
pub struct MonitorFrame<'a> {
    /// Per-channel windows, oldest sample first.
    pub channels: Vec<&'a [f32]>,
    /// Whether the plot should use the recording treatment.
    pub recording: bool,
}

/// Consumer-side monitor: the drain and its window, refreshed together on
/// the UI tick.
pub struct AudioMonitor {
    buffer: MonitorBuffer,
    drain: MonitorDrain,
}

impl AudioMonitor {
    /// Build a monitor and the feed its capture callback pushes into.
    pub fn new(channels: usize, window: usize, queue_capacity: usize) -> (MonitorFeed, Self) {
        let (feed, drain) = monitor_channel(queue_capacity);
        (
            feed,
            Self {
                buffer: MonitorBuffer::new(channels, window),
                drain,
            },
        )
    }

    /// One UI refresh. Drains every chunk queued since the last tick, so
    /// the plot never lags behind the capture stream, then returns the
    /// frame to render.
    pub fn render_tick(&mut self, is_recording: bool) -> MonitorFrame<'_> {
        self.drain.drain_into(&mut self.buffer);
        MonitorFrame {
            channels: (0..self.buffer.channels())
                .map(|ch| self.buffer.channel(ch))
                .collect(),
            recording: is_recording,
        }
    }

    /// Zero the window, e.g. after a device swap.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zero_filled() {
        let buffer = MonitorBuffer::new(2, 4);
        assert_eq!(buffer.channel(0), &[0.0; 4]);
        assert_eq!(buffer.channel(1), &[0.0; 4]);
    }

    #[test]
    fn test_push_shifts_left() {
        let mut buffer = MonitorBuffer::new(1, 4);
        buffer.push_frames(&[1.0, 2.0]);
        assert_eq!(buffer.channel(0), &[0.0, 0.0, 1.0, 2.0]);

        buffer.push_frames(&[3.0]);
        assert_eq!(buffer.channel(0), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_push_deinterleaves_channels() {
        let mut buffer = MonitorBuffer::new(2, 3);
        buffer.push_frames(&[0.1, -0.1, 0.2, -0.2]);

        assert_eq!(buffer.channel(0), &[0.0, 0.1, 0.2]);
        assert_eq!(buffer.channel(1), &[0.0, -0.1, -0.2]);
    }

    #[test]
    fn test_oversized_push_keeps_tail() {
        let mut buffer = MonitorBuffer::new(1, 3);
        buffer.push_frames(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buffer.channel(0), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_reset_zeroes_window() {
        let mut buffer = MonitorBuffer::new(1, 3);
        buffer.push_frames(&[1.0, 2.0, 3.0]);
        buffer.reset();
        assert_eq!(buffer.channel(0), &[0.0; 3]);
    }

    #[test]
    fn test_feed_drops_when_full() {
        let (feed, mut drain) = monitor_channel(2);
        feed.push(vec![1.0]);
        feed.push(vec![2.0]);
        feed.push(vec![3.0]); // dropped

        let mut buffer = MonitorBuffer::new(1, 4);
        assert_eq!(drain.drain_into(&mut buffer), 2);
        assert_eq!(buffer.channel(0), &[0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_drain_on_empty_queue() {
        let (_feed, mut drain) = monitor_channel(2);
        let mut buffer = MonitorBuffer::new(1, 4);
        assert_eq!(drain.drain_into(&mut buffer), 0);
    }

    #[test]
    fn test_window_never_grows() {
        // Chunks of size 3, 4, then 20 into a window of 10 leave exactly
        // the last 10 samples.
        let mut buffer = MonitorBuffer::new(1, 10);
        buffer.push_frames(&[1.0, 2.0, 3.0]);
        buffer.push_frames(&[4.0, 5.0, 6.0, 7.0]);
        let big: Vec<f32> = (8..28).map(|v| v as f32).collect();
        buffer.push_frames(&big);

        let expected: Vec<f32> = (18..28).map(|v| v as f32).collect();
        assert_eq!(buffer.channel(0), expected.as_slice());
    }

    #[test]
    fn test_render_tick_drains_everything_pending() {
        let (feed, mut monitor) = AudioMonitor::new(1, 4, 8);
        feed.push(vec![1.0]);
        feed.push(vec![2.0]);
        feed.push(vec![3.0]);

        let frame = monitor.render_tick(false);
        assert_eq!(frame.channels[0], &[0.0, 1.0, 2.0, 3.0]);
        assert!(!frame.recording);
    }

    #[test]
    fn test_render_tick_recording_flag() {
        let (_feed, mut monitor) = AudioMonitor::new(2, 4, 8);
        let frame = monitor.render_tick(true);
        assert!(frame.recording);
        assert_eq!(frame.channels.len(), 2);
    }
}
