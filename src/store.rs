use std::cell::RefCell;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, Result};
use serde::Serialize;
use tracing::warn;

pub const DISPLAY_NAME_KEY: &str = "display_name";

/// Best-effort persistence of the candidate's display name. Implementations
/// never fail loudly: a broken store must not interrupt an attempt.
pub trait NameStore {
    fn load_display_name(&self) -> Option<String>;
    fn save_display_name(&self, name: &str);
}

#[derive(Debug, Clone, Serialize)]
pub struct Preference {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
    }

    pub fn get_preference(&self, key: &str) -> Result<Option<Preference>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, updated_at FROM preferences WHERE key = ?1")?;

        let pref = stmt.query_row(params![key], |row| {
            Ok(Preference {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: row.get(2)?,
            })
        });

        match pref {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl NameStore for Store {
    fn load_display_name(&self) -> Option<String> {
        match self.get_preference(DISPLAY_NAME_KEY) {
            Ok(pref) => pref.map(|p| p.value),
            Err(e) => {
                warn!(error = %e, "could not read display name");
                None
            }
        }
    }

    fn save_display_name(&self, name: &str) {
        if let Err(e) = self.set_preference(DISPLAY_NAME_KEY, name) {
            warn!(error = %e, "could not save display name");
        }
    }
}

/// Process-local fallback used when the SQLite file cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: RefCell<Option<String>>,
}

impl NameStore for MemoryStore {
    fn load_display_name(&self) -> Option<String> {
        self.name.borrow().clone()
    }

    fn save_display_name(&self, name: &str) {
        *self.name.borrow_mut() = Some(name.to_string());
    }
}
