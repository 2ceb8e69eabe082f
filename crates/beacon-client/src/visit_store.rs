//! Per-user visit counters.
//!
//! The collector reports returning visitors from three values the client
//! carries across sessions: the running visit count, the timestamp of the
//! first visit and the timestamp of the previous visit. Stores keep one
//! record per application/user pair; lookups for unknown pairs return the
//! zero record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Visit statistics carried across sessions for one user of one application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Number of visits recorded so far.
    pub visit_count: u64,
    /// UNIX timestamp of the first recorded visit.
    pub first_visit_ts: Option<i64>,
    /// UNIX timestamp of the most recent recorded visit.
    pub last_visit_ts: Option<i64>,
}

/// Persistence seam for visit records.
///
/// Storage failures are not the application's problem: implementations log
/// and degrade to the zero record rather than surfacing errors into the
/// tracking path.
pub trait VisitStore: Send + Sync {
    fn load(&self, application: &str, user_id: &str) -> VisitRecord;
    fn store(&self, application: &str, user_id: &str, record: VisitRecord);
}

/// Process-lifetime store, also the test double.
#[derive(Debug, Default)]
pub struct MemoryVisitStore {
    records: Mutex<HashMap<(String, String), VisitRecord>>,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitStore for MemoryVisitStore {
    fn load(&self, application: &str, user_id: &str) -> VisitRecord {
        let records = self.records.lock().expect("lock poisoned");
        records
            .get(&(application.to_owned(), user_id.to_owned()))
            .copied()
            .unwrap_or_default()
    }

    fn store(&self, application: &str, user_id: &str, record: VisitRecord) {
        let mut records = self.records.lock().expect("lock poisoned");
        records.insert((application.to_owned(), user_id.to_owned()), record);
    }
}

type RecordMap = HashMap<String, HashMap<String, VisitRecord>>;

/// Single-file JSON store, keyed application then user.
///
/// Writes go through a sibling temp file and a rename, so a crash mid-write
/// leaves the previous file intact. The mutex serializes the
/// read-modify-write cycle within the process.
#[derive(Debug)]
pub struct JsonVisitStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonVisitStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The platform-conventional store location, `beacon/visits.json` under
    /// the user data directory. `None` when the platform reports no data
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("beacon").join("visits.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> RecordMap {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RecordMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read visit store");
                return RecordMap::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "visit store is not valid JSON, starting over");
                RecordMap::new()
            }
        }
    }

    fn write_map(&self, map: &RecordMap) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(map)?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl VisitStore for JsonVisitStore {
    fn load(&self, application: &str, user_id: &str) -> VisitRecord {
        let _guard = self.write_lock.lock().expect("lock poisoned");
        self.read_map()
            .get(application)
            .and_then(|users| users.get(user_id))
            .copied()
            .unwrap_or_default()
    }

    fn store(&self, application: &str, user_id: &str, record: VisitRecord) {
        let _guard = self.write_lock.lock().expect("lock poisoned");
        let mut map = self.read_map();
        map.entry(application.to_owned())
            .or_default()
            .insert(user_id.to_owned(), record);
        if let Err(e) = self.write_map(&map) {
            warn!(path = %self.path.display(), error = %e, "failed to write visit store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_per_pair() {
        let store = MemoryVisitStore::new();
        assert_eq!(store.load("app", "alice"), VisitRecord::default());

        let record = VisitRecord {
            visit_count: 3,
            first_visit_ts: Some(1_700_000_000),
            last_visit_ts: Some(1_700_050_000),
        };
        store.store("app", "alice", record);

        assert_eq!(store.load("app", "alice"), record);
        assert_eq!(store.load("app", "bob"), VisitRecord::default());
        assert_eq!(store.load("other", "alice"), VisitRecord::default());
    }

    #[test]
    fn json_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visits.json");

        let record = VisitRecord {
            visit_count: 1,
            first_visit_ts: Some(1_700_000_000),
            last_visit_ts: Some(1_700_000_000),
        };
        JsonVisitStore::new(&path).store("app", "alice", record);

        let reopened = JsonVisitStore::new(&path);
        assert_eq!(reopened.load("app", "alice"), record);
    }

    #[test]
    fn json_store_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("visits.json");

        let store = JsonVisitStore::new(&path);
        store.store("app", "alice", VisitRecord { visit_count: 2, ..Default::default() });
        assert_eq!(store.load("app", "alice").visit_count, 2);
    }

    #[test]
    fn corrupt_file_degrades_to_the_zero_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visits.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JsonVisitStore::new(&path);
        assert_eq!(store.load("app", "alice"), VisitRecord::default());

        // A store after the corruption starts a fresh file.
        store.store("app", "alice", VisitRecord { visit_count: 1, ..Default::default() });
        assert_eq!(store.load("app", "alice").visit_count, 1);
    }
}
