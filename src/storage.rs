use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::store::TaskStore;

/// Loads a store snapshot from `path`.
///
/// A missing file is an empty store. An unreadable or malformed file is an error,
/// so a bad snapshot is never silently replaced by an empty one.
pub fn load_store(path: &Path) -> Result<TaskStore> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot yet; starting empty");
        return Ok(TaskStore::new());
    }
    let s = fs::read_to_string(path).map_err(|source| TrackerError::Storage {
        path: path.to_path_buf(),
        source,
    })?;
    if s.trim().is_empty() {
        return Ok(TaskStore::new());
    }
    serde_json::from_str(&s).map_err(|source| TrackerError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a store snapshot to `path`, creating the parent directory if needed.
///
/// Overwrites the existing file.
pub fn save_store(path: &Path, store: &TaskStore) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| TrackerError::Storage {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }
    let s = serde_json::to_string_pretty(store)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| TrackerError::Storage {
            path: path.to_path_buf(),
            source,
        })?;
    f.write_all(s.as_bytes())?;
    debug!(path = %path.display(), tasks = store.len(), "snapshot saved");
    Ok(())
}

/// Deletes the snapshot file.
pub fn delete_store(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|source| TrackerError::Storage {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = load_store(&dir.path().join("nope.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_survives_a_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tasks.json");
        let mut store = TaskStore::new();
        store.add(NewTask::titled("Vacuum")).unwrap();
        save_store(&path, &store).unwrap();

        let mut loaded = load_store(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.add(NewTask::titled("Mop")), Some(2));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_store(&path), Err(TrackerError::Corrupt { .. })));
    }

    #[test]
    fn delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        save_store(&path, &TaskStore::new()).unwrap();
        delete_store(&path).unwrap();
        assert!(!path.exists());
        delete_store(&path).unwrap();
    }
}
