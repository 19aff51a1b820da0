//! CLI command implementations

pub mod audit;
pub mod ingest;
pub mod product;

/// Open the database, ensuring its parent directory and schema exist
pub(crate) fn open_db(path: &str) -> Result<rusqlite::Connection, Box<dyn std::error::Error>> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut conn = traceport_store::db::open(path)?;
    traceport_store::db::configure(&conn)?;
    traceport_store::migrations::apply_migrations(&mut conn)?;
    Ok(conn)
}
