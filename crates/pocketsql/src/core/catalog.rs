//! Named database files in one managed directory, with at most one of them
//! open at a time.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{Connection, OpenFlags};

use crate::{
    core::{command::unquote, schema, types::TextTable},
    error::{AppError, AppResult},
};

/// Every managed database file carries this suffix.
pub const DB_SUFFIX: &str = ".db";

const BUSY_TIMEOUT_MS: u64 = 2_000;

/// Normalizes a user-typed database name into a file name: trailing `;`
/// and one pair of surrounding quotes are stripped and [`DB_SUFFIX`] is
/// appended when missing.
pub fn normalize_db_name(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim();
    let mut name = unquote(trimmed).to_string();

    // Any spelling of the suffix is rewritten so listings find the file.
    let has_suffix = name.len() >= DB_SUFFIX.len()
        && name.is_char_boundary(name.len() - DB_SUFFIX.len())
        && name[name.len() - DB_SUFFIX.len()..].eq_ignore_ascii_case(DB_SUFFIX);
    if has_suffix {
        name.truncate(name.len() - DB_SUFFIX.len());
    }
    name.push_str(DB_SUFFIX);
    if name.len() == DB_SUFFIX.len() || name.contains(['/', '\\', '\0']) {
        return Err(AppError::InvalidDatabaseName(raw.to_string()));
    }
    Ok(name)
}

struct ActiveDb {
    name: String,
    conn: Connection,
}

/// Owns the single engine connection and the directory it lives in.
///
/// The active name and the connection are held together, so one is never
/// set without the other.
pub struct Catalog {
    data_dir: PathBuf,
    active: Option<ActiveDb>,
}

impl Catalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            active: None,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_database_name(&self) -> Option<&str> {
        self.active.as_ref().map(|db| db.name.as_str())
    }

    pub fn connection(&self) -> AppResult<&Connection> {
        self.active
            .as_ref()
            .map(|db| &db.conn)
            .ok_or(AppError::NoDatabaseOpen)
    }

    /// Opens (creating if needed) `name` and makes it the active database.
    ///
    /// The new file is opened before the previous connection is closed, so
    /// a failed open leaves the current database active.
    pub fn open_or_create(&mut self, name: &str) -> AppResult<String> {
        let name = normalize_db_name(name)?;
        let conn = open_conn(&self.data_dir.join(&name))?;
        self.close();
        tracing::info!(db = %name, "database opened");
        self.active = Some(ActiveDb {
            name: name.clone(),
            conn,
        });
        Ok(name)
    }

    /// `USE name`: same as [`Catalog::open_or_create`].
    pub fn use_database(&mut self, name: &str) -> AppResult<String> {
        self.open_or_create(name)
    }

    /// Closes the active connection, if any. Close errors are logged only.
    pub fn close(&mut self) {
        let Some(db) = self.active.take() else { return };
        match db.conn.close() {
            Ok(()) => tracing::debug!(db = %db.name, "database closed"),
            Err((_conn, e)) => tracing::warn!(db = %db.name, error = %e, "close failed; dropping handle"),
        }
    }

    /// Deletes the database file (and its WAL sidecars), closing it first
    /// when it is the active one.
    pub fn drop_database(&mut self, name: &str) -> AppResult<String> {
        let name = normalize_db_name(name)?;
        if self.current_database_name() == Some(name.as_str()) {
            self.close();
        }

        let path = self.data_dir.join(&name);
        if !path.is_file() {
            return Err(AppError::DatabaseNotFound(name));
        }
        fs::remove_file(&path)?;
        for suffix in ["-wal", "-shm", "-journal"] {
            let sidecar = with_suffix(&path, suffix);
            if sidecar.exists() {
                if let Err(e) = fs::remove_file(&sidecar) {
                    tracing::warn!(path = %sidecar.display(), error = %e, "failed to remove sidecar file");
                }
            }
        }
        tracing::info!(db = %name, "database dropped");
        Ok(name)
    }

    /// Database names (without suffix) found in the managed directory.
    pub fn list_databases(&self) -> AppResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else { continue };
            if let Some(stem) = file_name.strip_suffix(DB_SUFFIX) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn list_tables(&self) -> AppResult<Vec<String>> {
        schema::list_tables(self.connection()?)
    }

    pub fn describe(&self, table: &str) -> AppResult<TextTable> {
        schema::table_info(self.connection()?, table)
    }

    /// The active database file, byte for byte, after folding the WAL back
    /// into it.
    pub fn export_bytes(&self) -> AppResult<Vec<u8>> {
        let db = self.active.as_ref().ok_or(AppError::NoDatabaseOpen)?;
        db.conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(fs::read(self.data_dir.join(&db.name))?)
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_conn(path: &Path) -> AppResult<Connection> {
    let open_failed = |source: rusqlite::Error| AppError::DbOpenFailed {
        path: path.to_path_buf(),
        source,
    };
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
    let conn = Connection::open_with_flags(path, flags).map_err(open_failed)?;
    let _ = conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));
    configure(&conn).map_err(open_failed)?;
    Ok(conn)
}

/// WAL with `synchronous=NORMAL` trades durability on power loss for far
/// fewer fsyncs. Foreign keys are off by default in SQLite.
fn configure(conn: &Connection) -> rusqlite::Result<()> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        tracing::warn!(journal_mode = %mode, "WAL not available");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(dir.path()).unwrap();
        (dir, catalog)
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_db_name("shop").unwrap(), "shop.db");
        assert_eq!(normalize_db_name(" shop; ").unwrap(), "shop.db");
        assert_eq!(normalize_db_name("'shop'").unwrap(), "shop.db");
        assert_eq!(normalize_db_name("\"shop.db\";").unwrap(), "shop.db");
        assert_eq!(normalize_db_name("Shop.DB").unwrap(), "Shop.db");
        assert_eq!(normalize_db_name("shop.Db").unwrap(), "shop.db");
    }

    #[test]
    fn rejects_invalid_names() {
        for raw in ["", ";", "''", ".db", "'.db'", "../etc/x", "a/b", "a\\b"] {
            assert!(
                matches!(normalize_db_name(raw), Err(AppError::InvalidDatabaseName(_))),
                "{raw:?} accepted"
            );
        }
    }

    #[test]
    fn open_sets_pragmas() {
        let (_dir, mut cat) = catalog();
        assert_eq!(cat.open_or_create("shop").unwrap(), "shop.db");
        let conn = cat.connection().unwrap();
        let mode: String = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0)).unwrap();
        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0)).unwrap();
        let sync: i64 = conn.query_row("PRAGMA synchronous", [], |r| r.get(0)).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        assert_eq!(fk, 1);
        assert_eq!(sync, 1);
    }

    #[test]
    fn switching_replaces_active() {
        let (dir, mut cat) = catalog();
        cat.open_or_create("a").unwrap();
        cat.use_database("b").unwrap();
        assert_eq!(cat.current_database_name(), Some("b.db"));
        assert!(dir.path().join("a.db").is_file());
        assert_eq!(cat.list_databases().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn failed_open_keeps_previous() {
        let (dir, mut cat) = catalog();
        cat.open_or_create("good").unwrap();
        fs::write(dir.path().join("bad.db"), b"definitely not a sqlite file, just text").unwrap();
        assert!(cat.open_or_create("bad").is_err());
        assert_eq!(cat.current_database_name(), Some("good.db"));
        assert!(cat.list_tables().is_ok());
    }

    #[test]
    fn upper_case_suffix_is_listed() {
        let (dir, mut cat) = catalog();
        assert_eq!(cat.open_or_create("Shop.DB").unwrap(), "Shop.db");
        assert!(dir.path().join("Shop.db").is_file());
        assert_eq!(cat.list_databases().unwrap(), vec!["Shop"]);
        cat.drop_database("Shop.DB").unwrap();
        assert!(cat.list_databases().unwrap().is_empty());
    }

    #[test]
    fn drop_active_database() {
        let (dir, mut cat) = catalog();
        cat.open_or_create("shop").unwrap();
        cat.connection()
            .unwrap()
            .execute_batch("CREATE TABLE t (a INTEGER)")
            .unwrap();
        cat.drop_database("shop;").unwrap();
        assert!(!cat.is_open());
        assert_eq!(cat.current_database_name(), None);
        assert!(!dir.path().join("shop.db").exists());
        assert!(!dir.path().join("shop.db-wal").exists());
        assert!(cat.list_databases().unwrap().is_empty());
    }

    #[test]
    fn drop_missing_database() {
        let (_dir, mut cat) = catalog();
        let err = cat.drop_database("ghost").unwrap_err();
        assert_eq!(err.to_string(), "Database 'ghost.db' does not exist");
    }

    #[test]
    fn listing_ignores_other_files() {
        let (dir, cat) = catalog();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("b.db"), b"").unwrap();
        fs::write(dir.path().join("a.db"), b"").unwrap();
        fs::create_dir(dir.path().join("dir.db")).unwrap();
        assert_eq!(cat.list_databases().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn tables_need_open_database() {
        let (_dir, cat) = catalog();
        assert!(matches!(cat.list_tables(), Err(AppError::NoDatabaseOpen)));
        assert!(matches!(cat.export_bytes(), Err(AppError::NoDatabaseOpen)));
    }

    #[test]
    fn export_contains_committed_data() {
        let (dir, mut cat) = catalog();
        cat.open_or_create("shop").unwrap();
        cat.connection()
            .unwrap()
            .execute_batch("CREATE TABLE t (a TEXT); INSERT INTO t VALUES ('exported');")
            .unwrap();
        let bytes = cat.export_bytes().unwrap();
        assert!(bytes.starts_with(b"SQLite format 3\0"));

        let copy = dir.path().join("copy.sqlite");
        fs::write(&copy, &bytes).unwrap();
        let conn = Connection::open(&copy).unwrap();
        let v: String = conn.query_row("SELECT a FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(v, "exported");
    }
}
