//! Timeline markers mirrored from the recording store.
//!
//! Markers are never edited in place. On any store mutation the board is
//! rebuilt wholesale from the store's timestamp list, so the displayed
//! markers can never drift out of sync with the recordings.

use crate::timecode::ms_to_timestamp;

/// One timeline marker, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub timestamp_ms: u64,
    /// `HH:MM:SS.mmm` label shown next to the marker.
    pub label: String,
}

/// The full set of markers for the loaded video.
#[derive(Default)]
pub struct MarkerBoard {
    markers: Vec<Marker>,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all markers with one per timestamp in `times`. Input comes
    /// from the store and is already ascending.
    pub fn sync(&mut self, times: &[u64]) {
        self.markers.clear();
        self.markers.extend(times.iter().map(|&ts| Marker {
            timestamp_ms: ts,
            label: ms_to_timestamp(ts),
        }));
    }

    /// Drop every marker, e.g. when a new video is loaded.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Markers in timeline order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Marker positions as fractions of the video duration, for placing
    /// ticks along a seek bar. A zero duration yields no positions.
    pub fn fractions(&self, duration_ms: u64) -> Vec<f64> {
        if duration_ms == 0 {
            return Vec::new();
        }
        self.markers
            .iter()
            .map(|m| m.timestamp_ms as f64 / duration_ms as f64)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_rebuilds_wholesale() {
        let mut board = MarkerBoard::new();
        board.sync(&[100, 250, 900]);
        assert_eq!(board.markers().len(), 3);

        board.sync(&[250]);
        assert_eq!(board.markers().len(), 1);
        assert_eq!(board.markers()[0].timestamp_ms, 250);
    }

    #[test]
    fn test_labels_are_formatted_timestamps() {
        let mut board = MarkerBoard::new();
        board.sync(&[83_456]);
        assert_eq!(board.markers()[0].label, "00:01:23.456");
    }

    #[test]
    fn test_fractions_along_duration() {
        let mut board = MarkerBoard::new();
        board.sync(&[0, 30_000, 60_000]);
        assert_eq!(board.fractions(60_000), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_fractions_with_zero_duration() {
        let mut board = MarkerBoard::new();
        board.sync(&[100]);
        assert!(board.fractions(0).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut board = MarkerBoard::new();
        board.sync(&[100]);
        board.clear();
        assert!(board.is_empty());
    }
}
