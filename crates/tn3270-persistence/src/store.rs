//! Run Persistence (C8): `SavedRun` storage on disk with atomic writes
//! (§4.8).
//!
//! Layout: `<dir>/<run-id>.json`, one file per run, directory mode
//! `0750`, file mode `0600`. A save writes to a sibling temp file
//! (`<id>.json.tmp-<pid>`), fsyncs it, then renames it into place —
//! so a reader never observes a partially written run.

use std::fs::{self, File};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process;

use tn3270_chaos::SavedRun;

use crate::error::PersistenceError;

const DIR_MODE: u32 = 0o750;
const FILE_MODE: u32 = 0o600;

/// A directory of persisted [`SavedRun`]s.
pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    /// Open (creating if necessary) a runs directory at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        fs::set_permissions(&dir, fs::Permissions::from_mode(DIR_MODE))?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Atomically write `run` to `<dir>/<run.id>.json`.
    pub fn save(&self, run: &SavedRun) -> Result<(), PersistenceError> {
        let final_path = self.path_for(&run.id);
        let tmp_path = self.dir.join(format!("{}.json.tmp-{}", run.id, process::id()));

        let bytes = serde_json::to_vec_pretty(run)
            .map_err(|e| PersistenceError::Corrupt { id: run.id.clone(), reason: e.to_string() })?;

        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(FILE_MODE))?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Load one saved run by id.
    pub fn load(&self, id: &str) -> Result<SavedRun, PersistenceError> {
        let path = self.path_for(id);
        let text = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PersistenceError::NotFound { id: id.to_string() }
            } else {
                PersistenceError::Io(e)
            }
        })?;
        serde_json::from_str(&text)
            .map_err(|e| PersistenceError::Corrupt { id: id.to_string(), reason: e.to_string() })
    }

    /// List all saved runs, newest-first by `started_at`. A file that
    /// fails to parse is skipped (logged at debug level) rather than
    /// failing the whole listing.
    pub fn list(&self) -> Result<Vec<SavedRun>, PersistenceError> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_file(&path) {
                Ok(run) => runs.push(run),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable run file");
                }
            }
        }
        runs.sort_by_key(|r| std::cmp::Reverse(r.started_at));
        Ok(runs)
    }

    /// Remove a saved run. Returns `false` if it did not exist.
    pub fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn load_file(path: &Path) -> Result<SavedRun, PersistenceError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| PersistenceError::Corrupt {
        id: path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run(id: &str, started_at: u64) -> SavedRun {
        SavedRun {
            id: id.to_string(),
            host: "mvs.example.com".into(),
            port: 23,
            started_at,
            stopped_at: None,
            steps_run: 0,
            transitions: 0,
            screen_hashes: vec![],
            transition_list: vec![],
            steps: vec![],
            aid_key_counts: Default::default(),
            unique_input_values: vec![],
            attempts: vec![],
            mind_map: Default::default(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir();
        let store = RunStore::open(dir.path()).unwrap();
        let run = sample_run("20260101-000000-abcd", 100);
        store.save(&run).unwrap();
        let loaded = store.load(&run.id).unwrap();
        assert_eq!(loaded, run);
    }

    #[test]
    fn save_sets_file_mode_0600() {
        let dir = tempdir();
        let store = RunStore::open(dir.path()).unwrap();
        let run = sample_run("20260101-000000-abcd", 100);
        store.save(&run).unwrap();
        let meta = fs::metadata(store.path_for(&run.id)).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn open_sets_directory_mode_0750() {
        let dir = tempdir();
        let store_dir = dir.path().join("runs");
        let _store = RunStore::open(&store_dir).unwrap();
        let meta = fs::metadata(&store_dir).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o750);
    }

    #[test]
    fn load_missing_run_is_not_found() {
        let dir = tempdir();
        let store = RunStore::open(dir.path()).unwrap();
        assert!(matches!(store.load("nope"), Err(PersistenceError::NotFound { .. })));
    }

    #[test]
    fn list_sorts_newest_first_and_skips_corrupt_files() {
        let dir = tempdir();
        let store = RunStore::open(dir.path()).unwrap();
        store.save(&sample_run("run-a", 100)).unwrap();
        store.save(&sample_run("run-b", 300)).unwrap();
        store.save(&sample_run("run-c", 200)).unwrap();
        fs::write(dir.path().join("garbage.json"), b"not json").unwrap();

        let runs = store.list().unwrap();
        let ids: Vec<&str> = runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["run-b", "run-c", "run-a"]);
    }

    #[test]
    fn delete_removes_file_and_reports_absence() {
        let dir = tempdir();
        let store = RunStore::open(dir.path()).unwrap();
        let run = sample_run("run-a", 100);
        store.save(&run).unwrap();
        assert!(store.delete(&run.id).unwrap());
        assert!(!store.delete(&run.id).unwrap());
        assert!(store.load(&run.id).is_err());
    }

    /// A unique scratch directory under the OS temp dir, removed on drop.
    struct ScratchDir(PathBuf);
    impl ScratchDir {
        fn path(&self) -> &Path {
            &self.0
        }
    }
    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }
    fn tempdir() -> ScratchDir {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("tn3270-persistence-test-{nanos}-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }
}
