//! SQLite connection handling.
//!
//! Every component opens its own connection; `configure` applies the
//! pragmas the ingestion pipeline relies on: WAL so the subscriber can
//! append while CLI queries read, a busy timeout instead of immediate
//! SQLITE_BUSY, and foreign keys for the ledger.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the passport store at `path`
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory store, used by tests
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Apply connection pragmas for concurrent ingest-plus-query use
pub fn configure(conn: &Connection) -> Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;

    // journal_mode replies with the resulting mode, so it goes through
    // query_row rather than execute
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(from_rusqlite)?;

    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(from_rusqlite)?;
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(from_rusqlite)?;

    Ok(())
}
