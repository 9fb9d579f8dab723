//! On-disk layout for a per-video annotation set.
//!
//! Each video gets its own folder under the output directory, named after
//! the video file stem. The folder holds one WAV clip per recording, named
//! by its millisecond timestamp, plus an `annotations.json` index listing
//! the timestamps in ascending order.

use crate::error::NarratorError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_FILE: &str = "annotations.json";

/// Serialized form of the annotation index.
#[derive(Debug, Serialize, Deserialize)]
struct AnnotationIndex {
    /// RFC 3339 time of the last save.
    saved_at: String,
    /// Recording timestamps in ascending order, milliseconds.
    times: Vec<u64>,
}

/// Folder that holds the annotation set for `video_path`, under
/// `output_root`.
pub fn folder_for(output_root: &Path, video_path: &Path) -> PathBuf {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    output_root.join(format!("{}_annotations", stem))
}

/// Path of the clip recorded at `timestamp_ms`, inside `clips_dir`.
pub fn clip_path(clips_dir: &Path, timestamp_ms: u64) -> PathBuf {
    clips_dir.join(format!("{}.wav", timestamp_ms))
}

/// Whether `clips_dir` contains a persisted annotation index.
pub fn exists_for(clips_dir: &Path) -> bool {
    clips_dir.join(INDEX_FILE).is_file()
}

/// Read the persisted timestamps from `clips_dir`.
pub fn load_for(clips_dir: &Path) -> Result<Vec<u64>, NarratorError> {
    let index_path = clips_dir.join(INDEX_FILE);
    let contents = fs::read_to_string(&index_path)?;
    let index: AnnotationIndex = serde_json::from_str(&contents)
        .map_err(|e| NarratorError::CorruptAnnotations(format!("{}: {}", index_path.display(), e)))?;
    debug!("Loaded {} annotations from {:?}", index.times.len(), index_path);
    Ok(index.times)
}

/// Write the annotation index for `clips_dir`, creating the folder if
/// needed. Called after every store mutation so a crash never loses more
/// than the in-flight change.
pub fn save(clips_dir: &Path, times: &[u64]) -> Result<(), NarratorError> {
    fs::create_dir_all(clips_dir)?;

    let index = AnnotationIndex {
        saved_at: Utc::now().to_rfc3339(),
        times: times.to_vec(),
    };
    let json = serde_json::to_string_pretty(&index)
        .map_err(|e| NarratorError::Storage(format!("Failed to serialize index: {}", e)))?;

    fs::write(clips_dir.join(INDEX_FILE), json)?;
    Ok(())
}

/// Remove the clip file for a deleted recording. A missing file is not an
/// error; the recording may have been interrupted before any data was
/// written.
pub fn remove_clip(path: &Path) -> Result<(), NarratorError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_named_after_video_stem() {
        let folder = folder_for(Path::new("/out"), Path::new("/videos/epic_01.mp4"));
        assert_eq!(folder, PathBuf::from("/out/epic_01_annotations"));
    }

    #[test]
    fn test_clip_path_uses_timestamp() {
        let path = clip_path(Path::new("/out/epic_01_annotations"), 4000);
        assert_eq!(path, PathBuf::from("/out/epic_01_annotations/4000.wav"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let clips = dir.path().join("clip_dir");

        assert!(!exists_for(&clips));
        save(&clips, &[100, 250, 900]).unwrap();
        assert!(exists_for(&clips));

        assert_eq!(load_for(&clips).unwrap(), vec![100, 250, 900]);
    }

    #[test]
    fn test_load_rejects_malformed_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE), "not json").unwrap();

        assert!(matches!(
            load_for(dir.path()),
            Err(NarratorError::CorruptAnnotations(_))
        ));
    }

    #[test]
    fn test_remove_clip_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        remove_clip(&dir.path().join("4000.wav")).unwrap();
    }
}
