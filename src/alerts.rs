//! Alert journal.
//!
//! Every restricted-zone violation is appended here for later review. This is an
//! observability record only; zone geometry is never written to it.

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::render::AlertEvent;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub identity: String,
    pub frame_index: u64,
    pub recorded_at_s: u64,
}

pub trait AlertStore: Send {
    fn append(&mut self, alert: &AlertEvent, recorded_at_s: u64) -> Result<()>;

    /// Most recent alerts first.
    fn recent(&mut self, limit: usize) -> Result<Vec<AlertRecord>>;

    fn count(&mut self) -> Result<u64>;
}

#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    records: Vec<AlertRecord>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for InMemoryAlertStore {
    fn append(&mut self, alert: &AlertEvent, recorded_at_s: u64) -> Result<()> {
        self.records.push(AlertRecord {
            identity: alert.identity.clone(),
            frame_index: alert.frame_index,
            recorded_at_s,
        });
        Ok(())
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<AlertRecord>> {
        Ok(self.records.iter().rev().take(limit).cloned().collect())
    }

    fn count(&mut self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }
}

pub struct SqliteAlertStore {
    conn: Connection,
}

impl SqliteAlertStore {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let mut store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              recorded_at INTEGER NOT NULL,
              frame_index INTEGER NOT NULL,
              identity TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_alerts_recorded ON alerts(recorded_at);
            "#,
        )?;
        Ok(())
    }
}

impl AlertStore for SqliteAlertStore {
    fn append(&mut self, alert: &AlertEvent, recorded_at_s: u64) -> Result<()> {
        let recorded_at = i64::try_from(recorded_at_s)
            .map_err(|_| anyhow!("alert timestamp exceeds i64 range"))?;
        let frame_index = i64::try_from(alert.frame_index)
            .map_err(|_| anyhow!("frame index exceeds i64 range"))?;
        self.conn.execute(
            "INSERT INTO alerts(recorded_at, frame_index, identity) VALUES (?1, ?2, ?3)",
            params![recorded_at, frame_index, alert.identity],
        )?;
        Ok(())
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<AlertRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT identity, frame_index, recorded_at FROM alerts ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let identity: String = row.get(0)?;
            let frame_index: i64 = row.get(1)?;
            let recorded_at: i64 = row.get(2)?;
            Ok((identity, frame_index, recorded_at))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (identity, frame_index, recorded_at) = row?;
            out.push(AlertRecord {
                identity,
                frame_index: u64::try_from(frame_index)
                    .map_err(|_| anyhow!("corrupt alert journal: negative frame index"))?,
                recorded_at_s: u64::try_from(recorded_at)
                    .map_err(|_| anyhow!("corrupt alert journal: negative timestamp"))?,
            });
        }
        Ok(out)
    }

    fn count(&mut self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

/// Journal for a configured path; `None` keeps alerts in memory only.
pub fn open_alert_store(db_path: Option<&str>) -> Result<Box<dyn AlertStore>> {
    match db_path {
        Some(path) => Ok(Box::new(SqliteAlertStore::open(path)?)),
        None => Ok(Box::new(InMemoryAlertStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(identity: &str, frame_index: u64) -> AlertEvent {
        AlertEvent {
            identity: identity.to_string(),
            frame_index,
        }
    }

    fn exercise(store: &mut dyn AlertStore) {
        assert_eq!(store.count().unwrap(), 0);
        store.append(&alert("sovit", 3), 1_700_000_000).unwrap();
        store.append(&alert("Unknown", 4), 1_700_000_001).unwrap();
        store.append(&alert("niraj", 9), 1_700_000_002).unwrap();
        assert_eq!(store.count().unwrap(), 3);

        let recent = store.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].identity, "niraj");
        assert_eq!(recent[0].frame_index, 9);
        assert_eq!(recent[1].identity, "Unknown");
        assert_eq!(recent[1].recorded_at_s, 1_700_000_001);
    }

    #[test]
    fn in_memory_store_orders_newest_first() {
        exercise(&mut InMemoryAlertStore::new());
    }

    #[test]
    fn sqlite_store_orders_newest_first() {
        let mut store = SqliteAlertStore::open(":memory:").unwrap();
        exercise(&mut store);
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.db");
        let path = path.to_str().unwrap();
        {
            let mut store = SqliteAlertStore::open(path).unwrap();
            store.append(&alert("sovit", 1), 10).unwrap();
        }
        let mut store = open_alert_store(Some(path)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
