//! Durable, crash-safe persistence of one knowledge snapshot.
//!
//! The store owns a single JSON artifact holding an ordered array of
//! `{source, content}` records. Writes go through a temp-file-then-rename
//! discipline so a crash mid-write can never leave a truncated artifact
//! visible. Reads are deliberately tolerant: a missing or corrupt artifact is
//! "no knowledge", not an error, because the query path must stay usable
//! with a broken snapshot.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use askbase_shared::{AskbaseError, KnowledgeRecord, Result};

/// Handle to the on-disk snapshot artifact.
///
/// The store is the exclusive owner of the artifact; the snapshot is replaced
/// wholesale on each write and never patched in place, so readers need no
/// locking.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store for the artifact at `path`. Nothing is touched on disk
    /// until the first `write`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The artifact path this store owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the snapshot with `records`.
    ///
    /// Serializes to a hidden sibling temp file, then renames over the
    /// target. Either the whole new snapshot becomes visible or the previous
    /// one remains; a reader can never observe a partial write. Creates the
    /// containing directory if absent.
    pub fn write(&self, records: &[KnowledgeRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| AskbaseError::io(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| AskbaseError::Serialize(e.to_string()))?;

        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| AskbaseError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| AskbaseError::io(&self.path, e))?;

        info!(
            path = %self.path.display(),
            records = records.len(),
            "snapshot written"
        );
        Ok(())
    }

    /// Read the current snapshot.
    ///
    /// Returns an empty sequence when the artifact does not exist, cannot be
    /// read, or fails to parse. Corruption degrades to "no knowledge" rather
    /// than propagating upward.
    pub fn read(&self) -> Vec<KnowledgeRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot artifact, treating as empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Sibling temp file used by the atomic-replace discipline.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "snapshot.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> (PathBuf, SnapshotStore) {
        let dir = std::env::temp_dir().join(format!(
            "askbase-snapshot-{tag}-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let store = SnapshotStore::new(dir.join("snapshot.json"));
        (dir, store)
    }

    fn sample_records() -> Vec<KnowledgeRecord> {
        vec![
            KnowledgeRecord::new("https://example.com/laptops", "laptop listings"),
            KnowledgeRecord::new("https://example.com/phones", "phone listings"),
        ]
    }

    #[test]
    fn roundtrip_preserves_records_and_order() {
        let (dir, store) = temp_store("roundtrip");

        let records = sample_records();
        store.write(&records).unwrap();
        assert_eq!(store.read(), records);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn roundtrip_empty_sequence() {
        let (dir, store) = temp_store("empty");

        store.write(&[]).unwrap();
        assert!(store.path().exists());
        assert!(store.read().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_missing_artifact_is_empty() {
        let (dir, store) = temp_store("missing");
        assert!(store.read().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_corrupt_artifact_is_empty() {
        let (dir, store) = temp_store("corrupt");

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(store.path(), "{ not valid json").unwrap();
        assert!(store.read().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_creates_parent_directory() {
        let (dir, _) = temp_store("parents");
        let store = SnapshotStore::new(dir.join("nested/deeper/snapshot.json"));

        store.write(&sample_records()).unwrap();
        assert_eq!(store.read().len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn interrupted_write_leaves_previous_snapshot_readable() {
        let (dir, store) = temp_store("crash");

        let previous = sample_records();
        store.write(&previous).unwrap();

        // Simulate a crash mid-write of the next generation: the temp file
        // holds a truncated record array and the rename never happened.
        let temp = dir.join(".snapshot.json.tmp");
        std::fs::write(&temp, "[{\"source\": \"https://example.com/ne").unwrap();

        assert_eq!(store.read(), previous);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn successful_write_leaves_no_temp_files() {
        let (dir, store) = temp_store("no-temps");

        store.write(&sample_records()).unwrap();
        for entry in std::fs::read_dir(&dir).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rewrite_replaces_wholesale() {
        let (dir, store) = temp_store("replace");

        store.write(&sample_records()).unwrap();
        let next = vec![KnowledgeRecord::new("https://example.com/tablets", "tablets")];
        store.write(&next).unwrap();

        assert_eq!(store.read(), next);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
