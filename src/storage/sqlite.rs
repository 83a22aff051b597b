use super::ScanStore;
use crate::core::errors::{ReconError, ReconResult};
use crate::core::models::{ScanRecord, ScanTask, TaskStatus};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const RECORD_COLUMNS: &str = "id, target, tool, command, status, output, timestamp";

/// SQLite-backed scan log. A single connection behind a mutex serializes
/// writers, so concurrent tasks never interleave inserts.
#[derive(Clone)]
pub struct SqliteScanStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScanStore {
    pub fn new(db_path: impl AsRef<Path>) -> ReconResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn in_memory() -> ReconResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> ReconResult<()> {
        let conn = self.lock()?;

        // Millisecond timestamps keep "most recent first" meaningful within one run
        conn.execute(
            "CREATE TABLE IF NOT EXISTS scans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                target TEXT,
                tool TEXT,
                command TEXT,
                status TEXT,
                output TEXT,
                timestamp DATETIME DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scans_timestamp ON scans(timestamp)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> ReconResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReconError::StoreUnavailable("scan store lock poisoned".to_string()))
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ScanRecord> {
    let status: String = row.get(4)?;
    let status = status
        .parse::<TaskStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(ScanRecord {
        id: row.get(0)?,
        target: row.get(1)?,
        tool: row.get(2)?,
        command: row.get(3)?,
        status,
        output: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        timestamp: row.get(6)?,
    })
}

#[async_trait]
impl ScanStore for SqliteScanStore {
    async fn append(&self, task: &ScanTask) -> ReconResult<ScanRecord> {
        let conn = self.lock()?;
        let record = conn.query_row(
            &format!(
                "INSERT INTO scans (target, tool, command, status, output)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING {}",
                RECORD_COLUMNS
            ),
            params![
                &task.target,
                task.tool.id(),
                &task.command,
                task.status.as_str(),
                &task.output
            ],
            row_to_record,
        )?;
        Ok(record)
    }

    async fn list_all(&self) -> ReconResult<Vec<ScanRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM scans ORDER BY timestamp DESC, id DESC",
            RECORD_COLUMNS
        ))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn list_recent(&self, limit: usize) -> ReconResult<Vec<ScanRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM scans ORDER BY timestamp DESC, id DESC LIMIT ?1",
            RECORD_COLUMNS
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn clear_all(&self) -> ReconResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM scans", [])?;
        tracing::info!("Cleared {} scan records", removed);
        Ok(removed)
    }
}
