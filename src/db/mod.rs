use rusqlite::Connection;
use std::path::Path;
use tokio::task;
use crate::error::{Result, NotegraphError};

pub mod migrate;
pub mod notes;

pub use notes::{create_note, delete_note, get_note, list_notes, update_note, Note};

const PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
                       PRAGMA synchronous = NORMAL; \
                       PRAGMA foreign_keys = ON; \
                       PRAGMA temp_store = MEMORY;";

/// Database connection wrapper
#[derive(Debug, Clone)]
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new database connection with pragmas applied
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(NotegraphError::Database)?;
        conn.execute_batch(PRAGMAS)?;
        Ok(conn)
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        task::spawn_blocking(move || {
            let mut conn = db.open_connection()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| NotegraphError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }

    /// Open the database and bring its schema up to date
    pub async fn open_migrated<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db = Self::new(db_path);
        db.with_connection(migrate::run_migrations).await?;
        Ok(db)
    }
}
