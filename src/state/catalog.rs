use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

use super::data::CatalogRecord;
use crate::error::{Error, Result};

/// Connector for the SQLite catalog of (filename, title, artist) records.
///
/// Starts disconnected. Every query on a disconnected catalog returns
/// [`Error::NotConnected`] without touching the database, so callers can
/// tell "not connected" apart from "no rows".
///
/// Holds at most one `rusqlite::Connection`; it is `Send` but not `Sync`,
/// so share it across threads only behind a lock.
pub struct Catalog {
    conn: Option<Connection>,
    db_path: PathBuf,
}

impl Catalog {
    /// Create a disconnected catalog for the database at `db_path`
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            conn: None,
            db_path: db_path.into(),
        }
    }

    /// Open the database, closing any previous connection first.
    ///
    /// The parent directory and the table are created if missing.
    pub fn connect(&mut self) -> Result<()> {
        self.close()?;

        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.db_path)?;
        Self::init_schema(&conn)?;
        self.conn = Some(conn);

        tracing::info!("📁 Catalog connected at: {}", self.db_path.display());
        Ok(())
    }

    /// Close the connection if one is open
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| err)?;
            tracing::debug!("Catalog closed: {}", self.db_path.display());
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Append a record. Returns the number of rows inserted.
    pub fn insert(&self, filename: &str, title: &str, artist: &str) -> Result<usize> {
        let conn = self.connection()?;
        let inserted = conn.execute(
            "INSERT INTO filenames (FILENAME, TITLE, ARTIST) VALUES (?1, ?2, ?3)",
            params![filename, title, artist],
        )?;
        Ok(inserted)
    }

    /// Delete every record for `filename`. Returns the number of rows removed.
    pub fn remove(&self, filename: &str) -> Result<usize> {
        let conn = self.connection()?;
        let removed = conn.execute(
            "DELETE FROM filenames WHERE FILENAME = ?1",
            params![filename],
        )?;
        Ok(removed)
    }

    /// All records stored for `filename`, in insertion order
    pub fn get(&self, filename: &str) -> Result<Vec<CatalogRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT FILENAME, TITLE, ARTIST FROM filenames WHERE FILENAME = ?1 ORDER BY rowid",
        )?;

        let records = stmt
            .query_map(params![filename], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Every record in the catalog, in insertion order
    pub fn all(&self) -> Result<Vec<CatalogRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT FILENAME, TITLE, ARTIST FROM filenames ORDER BY rowid")?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Get a count of records in the catalog
    pub fn count(&self) -> Result<i64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM filenames", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Run caller-supplied SQL verbatim (may contain several statements)
    pub fn exec(&self, sql: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Delete every record. The table itself is kept.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.connection()?;
        let removed = conn.execute("DELETE FROM filenames", [])?;
        tracing::info!("Cleared {} catalog records", removed);
        Ok(removed)
    }

    fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::NotConnected)
    }

    /// Create the table and its lookup index if they don't exist
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS filenames (
                FILENAME    TEXT NOT NULL,
                TITLE       TEXT NOT NULL DEFAULT '',
                ARTIST      TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_filenames_filename
             ON filenames(FILENAME)",
            [],
        )?;

        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogRecord> {
    Ok(CatalogRecord {
        filename: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("db_path", &self.db_path)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!("Failed to close catalog: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected(dir: &tempfile::TempDir) -> Catalog {
        let mut catalog = Catalog::new(dir.path().join("library.db"));
        catalog.connect().unwrap();
        catalog
    }

    #[test]
    fn test_insert_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = connected(&dir);

        assert_eq!(catalog.insert("a.png", "T", "Ar").unwrap(), 1);

        let records = catalog.get("a.png").unwrap();
        assert_eq!(records, vec![CatalogRecord::new("a.png", "T", "Ar")]);
    }

    #[test]
    fn test_remove_then_get_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = connected(&dir);
        catalog.insert("a.png", "T", "Ar").unwrap();
        catalog.insert("b.png", "U", "Br").unwrap();

        assert_eq!(catalog.remove("a.png").unwrap(), 1);

        assert!(catalog.get("a.png").unwrap().is_empty());
        assert_eq!(catalog.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_filenames_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = connected(&dir);
        catalog.insert("a.png", "first", "x").unwrap();
        catalog.insert("a.png", "second", "y").unwrap();

        let titles: Vec<_> = catalog
            .get("a.png")
            .unwrap()
            .into_iter()
            .map(|record| record.title)
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(catalog.remove("a.png").unwrap(), 2);
    }

    #[test]
    fn test_disconnected_operations_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::new(dir.path().join("library.db"));

        assert!(matches!(catalog.insert("a", "b", "c"), Err(Error::NotConnected)));
        assert!(matches!(catalog.remove("a"), Err(Error::NotConnected)));
        assert!(matches!(catalog.get("a"), Err(Error::NotConnected)));
        assert!(matches!(catalog.all(), Err(Error::NotConnected)));
        assert!(matches!(catalog.count(), Err(Error::NotConnected)));
        assert!(matches!(catalog.exec("SELECT 1"), Err(Error::NotConnected)));
        assert!(matches!(catalog.clear(), Err(Error::NotConnected)));
        catalog.close().unwrap();

        // Nothing was created on disk
        assert!(!catalog.path().exists());
    }

    #[test]
    fn test_operations_after_close_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = connected(&dir);
        catalog.insert("a.png", "T", "Ar").unwrap();

        catalog.close().unwrap();
        assert!(!catalog.is_connected());
        assert!(matches!(catalog.get("a.png"), Err(Error::NotConnected)));

        // Records survive a reconnect
        catalog.connect().unwrap();
        assert_eq!(catalog.get("a.png").unwrap().len(), 1);
    }

    #[test]
    fn test_connect_twice_keeps_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = connected(&dir);
        catalog.insert("a.png", "T", "Ar").unwrap();

        catalog.connect().unwrap();

        assert!(catalog.is_connected());
        assert_eq!(catalog.count().unwrap(), 1);
    }

    #[test]
    fn test_quotes_do_not_change_the_statement() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = connected(&dir);
        let hostile = "x'); DROP TABLE filenames; --";

        catalog.insert("it's.png", "Don't", "O'Brien").unwrap();
        catalog.insert(hostile, "t", "a").unwrap();

        assert_eq!(
            catalog.get("it's.png").unwrap(),
            vec![CatalogRecord::new("it's.png", "Don't", "O'Brien")]
        );
        assert_eq!(catalog.get(hostile).unwrap().len(), 1);
        assert_eq!(catalog.count().unwrap(), 2);

        // A quoted lookup that would match everything when interpolated
        assert!(catalog.get("' OR '1'='1").unwrap().is_empty());
        assert_eq!(catalog.remove("' OR '1'='1").unwrap(), 0);
        assert_eq!(catalog.count().unwrap(), 2);
    }

    #[test]
    fn test_clear_keeps_table() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = connected(&dir);
        catalog.insert("a.png", "T", "Ar").unwrap();
        catalog.insert("b.png", "U", "Br").unwrap();

        assert_eq!(catalog.clear().unwrap(), 2);
        assert_eq!(catalog.count().unwrap(), 0);

        // Table is still usable
        catalog.insert("c.png", "V", "Cr").unwrap();
        assert_eq!(catalog.all().unwrap().len(), 1);
    }

    #[test]
    fn test_exec_runs_sql_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = connected(&dir);

        catalog
            .exec(
                "INSERT INTO filenames VALUES ('a.png', 'T', 'Ar');
                 INSERT INTO filenames VALUES ('b.png', 'U', 'Br');",
            )
            .unwrap();

        assert_eq!(
            catalog.all().unwrap(),
            vec![
                CatalogRecord::new("a.png", "T", "Ar"),
                CatalogRecord::new("b.png", "U", "Br"),
            ]
        );
        assert!(matches!(catalog.exec("NOT SQL"), Err(Error::Database(_))));
    }
}
