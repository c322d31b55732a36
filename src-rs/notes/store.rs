use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

const SQL_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    title TEXT,
    content TEXT,
    icon TEXT DEFAULT '',
    background_image TEXT DEFAULT '',
    is_favorite INTEGER DEFAULT 0,
    updated_at INTEGER
);";

/// Columns added after the first release, with their DDL.
const MIGRATIONS: &[(&str, &str)] = &[
    ("background_image", "ALTER TABLE notes ADD COLUMN background_image TEXT DEFAULT ''"),
    ("icon", "ALTER TABLE notes ADD COLUMN icon TEXT DEFAULT ''"),
    ("is_favorite", "ALTER TABLE notes ADD COLUMN is_favorite INTEGER DEFAULT 0"),
];

const SQL_UPSERT: &str = "
INSERT INTO notes (id, title, content, updated_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(id) DO UPDATE SET
    title = excluded.title,
    content = excluded.content,
    updated_at = excluded.updated_at";

const SQL_SELECT_NOTE: &str = "
SELECT id, COALESCE(title, ''), COALESCE(content, ''), COALESCE(icon, ''),
       COALESCE(background_image, ''), COALESCE(is_favorite, 0), COALESCE(updated_at, 0)
FROM notes WHERE id = ?1";

const SQL_LIST_NOTES: &str = "
SELECT id, COALESCE(title, ''), COALESCE(icon, ''), COALESCE(is_favorite, 0)
FROM notes ORDER BY is_favorite DESC, updated_at DESC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub icon: String,
    pub background_image: String,
    pub is_favorite: bool,
    pub updated_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMeta {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub is_favorite: bool,
}

/// Note ids double as directory names under the images root.
pub fn validate_note_id(note_id: &str) -> Result<()> {
    if note_id.is_empty() {
        anyhow::bail!("note_id is empty");
    }
    if note_id.len() > 128 {
        anyhow::bail!("note_id too long");
    }
    let ok = note_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        anyhow::bail!("invalid note_id");
    }
    Ok(())
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// SQLite-backed note table. The connection sits behind a `Mutex` so one
/// store can be shared by every FFI call.
pub struct NoteStore {
    conn: Mutex<Connection>,
}

impl NoteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("failed to create database directory")?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SQL_SCHEMA)
            .context("failed to create notes table")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("note store lock poisoned"))
    }

    /// Insert or update title/content. Icon, background and favorite flag of
    /// an existing note are left alone.
    pub fn save_note(&self, id: &str, title: &str, content: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(SQL_UPSERT, params![id, title, content, now_ms()])
            .context("failed to save note")?;
        Ok(())
    }

    pub fn load_note(&self, id: &str) -> Result<Option<Note>> {
        let conn = self.lock()?;
        conn.query_row(SQL_SELECT_NOTE, [id], |row| {
            Ok(Note {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                icon: row.get(3)?,
                background_image: row.get(4)?,
                is_favorite: row.get::<_, i64>(5)? != 0,
                updated_at_ms: row.get(6)?,
            })
        })
        .optional()
        .context("failed to load note")
    }

    /// Favorites first, then most recently updated.
    pub fn list_notes(&self) -> Result<Vec<NoteMeta>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SQL_LIST_NOTES).context("failed to prepare note list")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(NoteMeta {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    icon: row.get(2)?,
                    is_favorite: row.get::<_, i64>(3)? != 0,
                })
            })
            .context("failed to list notes")?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row.context("failed to read note row")?);
        }
        Ok(notes)
    }

    pub fn set_background(&self, id: &str, background_image: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE notes SET background_image = ?1 WHERE id = ?2",
            params![background_image, id],
        )
        .context("failed to set note background")?;
        Ok(())
    }

    pub fn set_icon(&self, id: &str, icon: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("UPDATE notes SET icon = ?1 WHERE id = ?2", params![icon, id])
            .context("failed to set note icon")?;
        Ok(())
    }

    pub fn toggle_favorite(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE notes SET is_favorite = CASE WHEN COALESCE(is_favorite, 0) = 0 THEN 1 ELSE 0 END WHERE id = ?1",
            [id],
        )
        .context("failed to toggle favorite")?;
        Ok(())
    }

    pub fn delete_note(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM notes WHERE id = ?1", [id])
            .context("failed to delete note")?;
        Ok(())
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    let mut stmt = conn
        .prepare("PRAGMA table_info(notes)")
        .context("failed to inspect notes table")?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("failed to read notes columns")?
        .collect::<rusqlite::Result<_>>()
        .context("failed to read notes columns")?;

    for (column, ddl) in MIGRATIONS {
        if !existing.iter().any(|c| c == column) {
            log::info!("Migrating notes table: adding column {}", column);
            conn.execute_batch(ddl)
                .with_context(|| format!("failed to add column {}", column))?;
        }
    }
    Ok(())
}
