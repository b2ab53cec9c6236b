mod queries;

use std::fs;
use std::path::PathBuf;

use product_inspect_application::{ApplicationError, SnapshotStore};
use rusqlite::Connection;

use crate::migrations::MIGRATIONS;

#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    path: PathBuf,
}

impl SqliteSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        Connection::open(&self.path)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "snapshot path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration)
                .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        }

        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::find_snapshot(&conn, key)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }

    fn save(&self, key: &str, value: &str, updated_at: &str) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        queries::upsert_snapshot(&conn, key, value, updated_at)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use product_inspect_application::{Clock, InspectionStore, STATS_KEY};
    use product_inspect_domain::{Classification, Counters, Detection, DetectionBatch, Region};
    use tempfile::TempDir;

    use super::*;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 3, 16, 8, 0, 0)
                .single()
                .expect("valid time")
        }
    }

    #[test]
    fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("nested").join("inspection.sqlite3");
        let store = SqliteSnapshotStore::new(&db_path);
        store.initialize().expect("initialize");

        let conn = Connection::open(db_path).expect("open");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='snapshots'",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(count, 1);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteSnapshotStore::new(dir.path().join("inspection.sqlite3"));
        store.initialize().expect("initialize");

        assert_eq!(store.load("companyInfo").expect("load"), None);
        store
            .save("companyInfo", r#"{"name":"A"}"#, "2026-03-16T08:00:00.000Z")
            .expect("save");
        store
            .save("companyInfo", r#"{"name":"B"}"#, "2026-03-16T08:00:01.000Z")
            .expect("save");

        assert_eq!(
            store.load("companyInfo").expect("load").as_deref(),
            Some(r#"{"name":"B"}"#)
        );
    }

    #[test]
    fn store_state_survives_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("inspection.sqlite3");

        let mut first = InspectionStore::new(
            Box::new(SqliteSnapshotStore::new(&db_path)),
            Arc::new(FixedClock),
        );
        first.restore().expect("restore");
        first
            .record_batch(&DetectionBatch {
                detections: vec![Detection {
                    id: 42,
                    region: Region {
                        x: 140,
                        y: 20,
                        width: 100,
                        height: 250,
                    },
                    classification: Classification::Bad,
                    confidence: 0.88,
                    timestamp: "2026-03-16T08:00:00.000Z".to_string(),
                }],
                processing_time_ms: 9,
            })
            .expect("record");

        let mut second = InspectionStore::new(
            Box::new(SqliteSnapshotStore::new(&db_path)),
            Arc::new(FixedClock),
        );
        second.restore().expect("restore");

        assert_eq!(
            second.counters(),
            Counters {
                total: 1,
                good: 0,
                bad: 1,
                speed: 9
            }
        );
        assert_eq!(second.history().newest(1)[0].id, 42);
        assert_eq!(second.company().products.len(), 2);
    }

    #[test]
    fn corrupt_row_falls_back_to_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("inspection.sqlite3");
        let snapshots = SqliteSnapshotStore::new(&db_path);
        snapshots.initialize().expect("initialize");
        snapshots
            .save(STATS_KEY, "[1,2", "2026-03-16T08:00:00.000Z")
            .expect("save");

        let mut store = InspectionStore::new(Box::new(snapshots), Arc::new(FixedClock));
        store.restore().expect("restore");

        assert_eq!(store.counters(), Counters::default());
    }
}
