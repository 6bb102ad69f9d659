// ============================================================
// Layer 4 - Document Store
// ============================================================
// Resolves a selected document id to its section text.
//
// The textbook lives in a SQLite file with one table:
//
//   documents(id, text)     id = row index in the term matrix
//
// The text is read from the second column by position, so the
// column may be named anything (`text`, `body`, `section`).
//
// The connection is opened once, read-only, when the pipeline is
// built and reused for every lookup. A missing id is an error:
// the index only ever selects ids that were written alongside it.

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use crate::domain::document::DocId;
use crate::domain::error::{QaError, Result};
use crate::domain::traits::DocumentStore;

/// SQLite-backed store over the `documents` table.
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Open an existing database read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::info!("Opened document store '{}'", path.display());
        Ok(Self { conn })
    }

    /// Number of rows in `documents`.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn fetch(&self, id: DocId) -> Result<String> {
        // Ids are bound as text; SQLite's column affinity makes this
        // match both INTEGER and TEXT id columns.
        let text: Option<String> = self.conn
            .query_row(
                "SELECT * FROM documents WHERE id = ?1 LIMIT 1",
                [id.to_string()],
                |row| row.get(1),
            )
            .optional()?;

        text.ok_or(QaError::DocumentNotFound(id))
    }
}

/// Store held entirely in memory. Same contract as the SQLite store.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryDocumentStore {
    docs: std::collections::HashMap<DocId, String>,
}

#[cfg(test)]
impl MemoryDocumentStore {
    pub fn new(documents: impl IntoIterator<Item = crate::domain::document::Document>) -> Self {
        Self {
            docs: documents.into_iter().map(|d| (d.id, d.text)).collect(),
        }
    }
}

#[cfg(test)]
impl DocumentStore for MemoryDocumentStore {
    fn fetch(&self, id: DocId) -> Result<String> {
        self.docs.get(&id).cloned().ok_or(QaError::DocumentNotFound(id))
    }
}
