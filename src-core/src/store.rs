//! Ordered collection of timestamped recordings for the loaded video.
//!
//! The store is created when a video is loaded (possibly hydrated from a
//! persisted annotation set) and destroyed when a new video replaces it.
//! Keys are millisecond offsets into the video timeline and are unique;
//! iteration order is always ascending.

use crate::annotations;
use crate::error::NarratorError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single audio annotation. Immutable once created; identified solely by
/// its timeline position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Position in the video timeline at which recording started.
    pub timestamp_ms: u64,
    /// File the captured clip is written to.
    pub audio_path: PathBuf,
}

/// Mapping from `timestamp_ms` to [`Recording`], kept sorted by key.
pub struct TimestampStore {
    clips_dir: PathBuf,
    recordings: BTreeMap<u64, Recording>,
}

impl TimestampStore {
    /// Create an empty store whose clips live under `clips_dir`.
    pub fn new(clips_dir: PathBuf) -> Self {
        Self {
            clips_dir,
            recordings: BTreeMap::new(),
        }
    }

    /// Whether a persisted annotation set exists under `clips_dir`.
    pub fn exists(clips_dir: &Path) -> bool {
        annotations::exists_for(clips_dir)
    }

    /// Hydrate a store from the persisted annotation set under `clips_dir`.
    ///
    /// Duplicate or unsorted persisted input is rejected with
    /// `CorruptAnnotations` rather than silently partially loaded.
    pub fn load(clips_dir: PathBuf) -> Result<Self, NarratorError> {
        let times = annotations::load_for(&clips_dir)?;
        Self::hydrate(clips_dir, &times)
    }

    /// Build a store from an already-loaded sequence of timestamps,
    /// enforcing the strictly-ascending unique-key invariant.
    pub fn hydrate(clips_dir: PathBuf, times: &[u64]) -> Result<Self, NarratorError> {
        let mut store = Self::new(clips_dir);

        for window in times.windows(2) {
            if window[1] <= window[0] {
                return Err(NarratorError::CorruptAnnotations(format!(
                    "timestamps not strictly ascending: {} then {}",
                    window[0], window[1]
                )));
            }
        }

        for &ts in times {
            let audio_path = annotations::clip_path(&store.clips_dir, ts);
            store.recordings.insert(
                ts,
                Recording {
                    timestamp_ms: ts,
                    audio_path,
                },
            );
        }

        debug!("Hydrated {} recordings", store.recordings.len());
        Ok(store)
    }

    /// Add a recording at `timestamp_ms`, allocating its clip path and
    /// persisting the updated index.
    ///
    /// Fails with `InvalidState` if a recording already exists at that
    /// timestamp (should not occur under normal flow since playback time
    /// strictly advances between recordings).
    pub fn add(&mut self, timestamp_ms: u64) -> Result<&Recording, NarratorError> {
        if self.recordings.contains_key(&timestamp_ms) {
            return Err(NarratorError::InvalidState(format!(
                "recording already exists at {} ms",
                timestamp_ms
            )));
        }

        let audio_path = annotations::clip_path(&self.clips_dir, timestamp_ms);
        self.recordings.insert(
            timestamp_ms,
            Recording {
                timestamp_ms,
                audio_path,
            },
        );
        self.persist()?;

        Ok(&self.recordings[&timestamp_ms])
    }

    /// Remove the recording at `timestamp_ms`.
    /// Fails with `NotFound` if absent. The caller is responsible for
    /// pausing playback and stopping an in-flight capture first.
    pub fn delete(&mut self, timestamp_ms: u64) -> Result<Recording, NarratorError> {
        let removed = self
            .recordings
            .remove(&timestamp_ms)
            .ok_or(NarratorError::NotFound(timestamp_ms))?;
        self.persist()?;
        Ok(removed)
    }

    /// Remove the recording with the greatest timestamp.
    /// Fails with `EmptyStore` if there are no recordings.
    pub fn delete_last(&mut self) -> Result<Recording, NarratorError> {
        let last = self.last_time().ok_or(NarratorError::EmptyStore)?;
        self.delete(last)
    }

    /// Timestamp of the most recent recording, if any.
    pub fn last_time(&self) -> Option<u64> {
        self.recordings.keys().next_back().copied()
    }

    /// All recording timestamps, ascending.
    pub fn times(&self) -> Vec<u64> {
        self.recordings.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    /// Clip path of the recording at `timestamp_ms`, if present.
    pub fn clip_path(&self, timestamp_ms: u64) -> Option<&Path> {
        self.recordings
            .get(&timestamp_ms)
            .map(|r| r.audio_path.as_path())
    }

    /// Directory the per-video clips and index live in.
    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    fn persist(&self) -> Result<(), NarratorError> {
        annotations::save(&self.clips_dir, &self.times())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, TimestampStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TimestampStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn test_times_stay_sorted_and_unique() {
        let (_dir, mut store) = store();
        store.add(900).unwrap();
        store.add(100).unwrap();
        store.add(250).unwrap();

        assert_eq!(store.times(), vec![100, 250, 900]);

        store.delete(250).unwrap();
        store.add(400).unwrap();
        assert_eq!(store.times(), vec![100, 400, 900]);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let (_dir, mut store) = store();
        store.add(4000).unwrap();

        assert!(matches!(
            store.add(4000),
            Err(NarratorError::InvalidState(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_last_removes_greatest() {
        let (_dir, mut store) = store();
        for ts in [100, 250, 900] {
            store.add(ts).unwrap();
        }

        let removed = store.delete_last().unwrap();
        assert_eq!(removed.timestamp_ms, 900);
        assert_eq!(store.times(), vec![100, 250]);
    }

    #[test]
    fn test_delete_last_on_empty_store() {
        let (_dir, mut store) = store();
        assert!(matches!(store.delete_last(), Err(NarratorError::EmptyStore)));
    }

    #[test]
    fn test_delete_missing_timestamp() {
        let (_dir, mut store) = store();
        store.add(100).unwrap();
        assert!(matches!(store.delete(200), Err(NarratorError::NotFound(200))));
    }

    #[test]
    fn test_hydrate_rejects_unsorted_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = TimestampStore::hydrate(dir.path().to_path_buf(), &[100, 900, 250]);
        assert!(matches!(result, Err(NarratorError::CorruptAnnotations(_))));
    }

    #[test]
    fn test_hydrate_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let result = TimestampStore::hydrate(dir.path().to_path_buf(), &[100, 100, 250]);
        assert!(matches!(result, Err(NarratorError::CorruptAnnotations(_))));
    }

    #[test]
    fn test_clip_path_derived_from_timestamp() {
        let (_dir, mut store) = store();
        let rec = store.add(4000).unwrap().clone();
        assert!(rec.audio_path.ends_with("4000.wav"));
        assert_eq!(store.clip_path(4000), Some(rec.audio_path.as_path()));
        assert_eq!(store.clip_path(4001), None);
    }

    #[test]
    fn test_roundtrip_through_persistence() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = TimestampStore::new(dir.path().to_path_buf());
            store.add(100).unwrap();
            store.add(250).unwrap();
        }

        assert!(TimestampStore::exists(dir.path()));
        let reloaded = TimestampStore::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.times(), vec![100, 250]);
    }
}
