//! Product repository
//!
//! Products persist as their full JSON aggregate body plus a few indexed
//! columns mirrored out of the body for filtering. There is no DELETE:
//! deactivation flips the is_active flag and keeps the row.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use traceport_core::Product;

/// SQLite repository for product aggregates
pub struct ProductRepo;

impl ProductRepo {
    /// Insert or update a product
    ///
    /// The indexed columns are re-mirrored from the aggregate on every
    /// write, so they can never drift from the body.
    pub fn upsert(conn: &Connection, product: &Product) -> Result<()> {
        let body = serde_json::to_string(product)
            .map_err(traceport_core::TraceportError::from)?;
        let product_code = product
            .identification
            .serial_number
            .as_deref()
            .or(product.identification.internal_code.as_deref());

        conn.execute(
            "INSERT INTO products (id, product_code, owner_user_id, company_user_id, is_active, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                product_code = excluded.product_code,
                owner_user_id = excluded.owner_user_id,
                company_user_id = excluded.company_user_id,
                is_active = excluded.is_active,
                body = excluded.body,
                updated_at = excluded.updated_at",
            rusqlite::params![
                product.id,
                product_code,
                product.owner_user_id,
                product.company_user_id,
                if product.is_active() { 1 } else { 0 },
                body,
                product.created_at.timestamp_millis(),
                product.updated_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get a product by ID
    pub fn get(conn: &Connection, product_id: &str) -> Result<Option<Product>> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM products WHERE id = ?",
                [product_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        match body {
            None => Ok(None),
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| corrupt_row("products", product_id, e)),
        }
    }

    /// List all active products, newest first
    pub fn list_active(conn: &Connection) -> Result<Vec<Product>> {
        let mut stmt = conn
            .prepare("SELECT id, body FROM products WHERE is_active = 1 ORDER BY created_at DESC, id DESC")
            .map_err(from_rusqlite)?;

        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter()
            .map(|(id, body)| {
                serde_json::from_str(&body).map_err(|e| corrupt_row("products", &id, e))
            })
            .collect()
    }

    /// Look up a product by serial number or internal code
    pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<Product>> {
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT id, body FROM products WHERE product_code = ? LIMIT 1",
                [code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(from_rusqlite)?;

        match row {
            None => Ok(None),
            Some((id, body)) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| corrupt_row("products", &id, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use traceport_core::Identification;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn product(id: &str) -> Product {
        Product::new(id.to_string(), Identification::new("Acme", "Conveyor X1"))
    }

    #[test]
    fn test_upsert_and_get_round_trip() {
        let conn = setup();
        let p = product("prod-1");

        ProductRepo::upsert(&conn, &p).unwrap();
        let loaded = ProductRepo::get(&conn, "prod-1").unwrap().unwrap();
        assert_eq!(loaded, p);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = setup();
        assert!(ProductRepo::get(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let conn = setup();
        let mut p = product("prod-1");
        ProductRepo::upsert(&conn, &p).unwrap();

        p.description = Some("updated".to_string());
        p.touch();
        ProductRepo::upsert(&conn, &p).unwrap();

        let loaded = ProductRepo::get(&conn, "prod-1").unwrap().unwrap();
        assert_eq!(loaded.description.as_deref(), Some("updated"));
    }

    #[test]
    fn test_list_active_excludes_deactivated() {
        let conn = setup();
        let active = product("prod-1");
        let mut inactive = product("prod-2");
        inactive.identification.is_active = false;

        ProductRepo::upsert(&conn, &active).unwrap();
        ProductRepo::upsert(&conn, &inactive).unwrap();

        let listed = ProductRepo::list_active(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "prod-1");

        // The deactivated row still exists
        assert!(ProductRepo::get(&conn, "prod-2").unwrap().is_some());
    }

    #[test]
    fn test_find_by_code_uses_serial_then_internal() {
        let conn = setup();
        let mut by_serial = product("prod-1");
        by_serial.identification.serial_number = Some("SN-1".to_string());
        let mut by_internal = product("prod-2");
        by_internal.identification.internal_code = Some("IC-2".to_string());

        ProductRepo::upsert(&conn, &by_serial).unwrap();
        ProductRepo::upsert(&conn, &by_internal).unwrap();

        assert_eq!(
            ProductRepo::find_by_code(&conn, "SN-1").unwrap().unwrap().id,
            "prod-1"
        );
        assert_eq!(
            ProductRepo::find_by_code(&conn, "IC-2").unwrap().unwrap().id,
            "prod-2"
        );
        assert!(ProductRepo::find_by_code(&conn, "missing").unwrap().is_none());
    }
}
