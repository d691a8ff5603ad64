//! SQLite storage implementation.
//!
//! ## Schema
//!
//! ```text
//! paper(id INTEGER PRIMARY KEY, conference TEXT, year INTEGER,
//!       title TEXT, authors TEXT, abstract TEXT)
//! ```
//!
//! Authors are stored as a single `", "`-joined string.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params, params_from_iter};

use super::{PaperFilter, PaperStore, SearchField};
use crate::error::{AppError, Result};
use crate::models::{Conference, PaperKey, PaperRecord};

const AUTHOR_SEPARATOR: &str = ", ";

/// SQLite-backed paper store.
///
/// Construct once at process start with [`SqliteStore::open`] and release
/// with [`SqliteStore::close`].
#[derive(Debug)]
pub struct SqliteStore {
    path: Option<PathBuf>,
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init_schema(&conn)?;
        Ok(Self {
            path: Some(path.as_ref().to_path_buf()),
            connection: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            path: None,
            connection: Mutex::new(conn),
        })
    }

    /// Path of the backing file, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and close the underlying connection.
    pub fn close(self) -> Result<()> {
        let conn = self
            .connection
            .into_inner()
            .map_err(|_| AppError::Storage("connection lock poisoned".into()))?;
        conn.close().map_err(|(_, e)| AppError::Database(e))
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS paper (
                id          INTEGER PRIMARY KEY,
                conference  TEXT NOT NULL,
                year        INTEGER NOT NULL,
                title       TEXT NOT NULL,
                authors     TEXT NOT NULL DEFAULT '',
                abstract    TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_paper_unit ON paper(conference, year);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| AppError::Storage("connection lock poisoned".into()))
    }

    /// Build a `LIKE` pattern matching `needle` anywhere in the column.
    fn like_pattern(needle: &str) -> String {
        let escaped = needle
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    fn split_authors(joined: &str) -> Vec<String> {
        joined
            .split(AUTHOR_SEPARATOR)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect()
    }
}

impl PaperStore for SqliteStore {
    fn save(&self, paper: &PaperRecord) -> Result<()> {
        log::debug!(
            "Adding paper {} with abstract {:.20}...",
            paper.title,
            paper.abstract_text
        );
        self.conn()?.execute(
            "INSERT INTO paper (conference, year, title, authors, abstract)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                paper.conference.name(),
                paper.year,
                paper.title,
                paper.authors.join(AUTHOR_SEPARATOR),
                paper.abstract_text,
            ],
        )?;
        Ok(())
    }

    fn exists(&self, key: PaperKey<'_>) -> Result<bool> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT 1 FROM paper
             WHERE conference = ?1 AND year = ?2 AND title = ?3 AND abstract = ?4
             LIMIT 1",
        )?;
        Ok(stmt.exists(params![
            key.conference.name(),
            key.year,
            key.title,
            key.abstract_text,
        ])?)
    }

    fn query(&self, filter: &PaperFilter) -> Result<Vec<PaperRecord>> {
        let column = match filter.field {
            SearchField::Title => "title",
            SearchField::Abstract => "abstract",
        };

        let mut sql =
            String::from("SELECT conference, year, title, authors, abstract FROM paper");
        for (i, _) in filter.contains.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("{column} LIKE ?{} ESCAPE '\\'", i + 1));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(filter.contains.iter().map(|n| Self::like_pattern(n))),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;

        let mut papers = Vec::new();
        for row in rows {
            let (conference, year, title, authors, abstract_text) = row?;
            papers.push(PaperRecord {
                conference: conference.parse::<Conference>()?,
                year,
                title,
                authors: Self::split_authors(&authors),
                abstract_text,
            });
        }
        Ok(papers)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM paper", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
