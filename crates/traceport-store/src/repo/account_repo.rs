//! Account repository
//!
//! Resolves stored identities to role profiles for policy evaluation and
//! looks up owners by their NIF/NISS tax identifiers. Credentials and
//! login flows are out of scope.

use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use traceport_core::model::{Account, RoleProfile};

/// SQLite repository for account identities
pub struct AccountRepo;

impl AccountRepo {
    /// Insert or update an account
    pub fn upsert(conn: &Connection, account: &Account) -> Result<()> {
        conn.execute(
            "INSERT INTO accounts (id, full_name, email, nif, niss, is_company, is_superuser, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                nif = excluded.nif,
                niss = excluded.niss,
                is_company = excluded.is_company,
                is_superuser = excluded.is_superuser,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at",
            params![
                account.id,
                account.full_name,
                account.email,
                account.nif,
                account.niss,
                if account.is_company { 1 } else { 0 },
                if account.is_superuser { 1 } else { 0 },
                if account.is_active { 1 } else { 0 },
                account.created_at.timestamp_millis(),
                account.updated_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get an account by ID
    pub fn get(conn: &Connection, account_id: &str) -> Result<Option<Account>> {
        conn.query_row(
            "SELECT id, full_name, email, nif, niss, is_company, is_superuser, is_active, created_at, updated_at
             FROM accounts WHERE id = ?",
            [account_id],
            account_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Resolve an account to the role profile policy evaluation consumes
    pub fn resolve_profile(conn: &Connection, account_id: &str) -> Result<Option<RoleProfile>> {
        Ok(Self::get(conn, account_id)?.map(|a| a.to_profile()))
    }

    /// Find an active account by NIF or NISS tax identifier
    pub fn find_by_tax_id(conn: &Connection, tax_id: &str) -> Result<Option<Account>> {
        conn.query_row(
            "SELECT id, full_name, email, nif, niss, is_company, is_superuser, is_active, created_at, updated_at
             FROM accounts WHERE (nif = ?1 OR niss = ?1) AND is_active = 1 LIMIT 1",
            [tax_id],
            account_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let is_company: i32 = row.get(5)?;
    let is_superuser: i32 = row.get(6)?;
    let is_active: i32 = row.get(7)?;
    let created_at: i64 = row.get(8)?;
    let updated_at: i64 = row.get(9)?;

    Ok(Account {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        nif: row.get(3)?,
        niss: row.get(4)?,
        is_company: is_company != 0,
        is_superuser: is_superuser != 0,
        is_active: is_active != 0,
        created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
        updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_and_resolve_profile() {
        let conn = setup();
        let mut account = Account::new("acc-1", "Acme Lda", "ops@acme.example");
        account.is_company = true;

        AccountRepo::upsert(&conn, &account).unwrap();
        let profile = AccountRepo::resolve_profile(&conn, "acc-1").unwrap().unwrap();

        assert_eq!(profile.id, "acc-1");
        assert!(profile.is_company);
        assert!(!profile.is_superuser);
        assert_eq!(profile.name.as_deref(), Some("Acme Lda"));
    }

    #[test]
    fn test_resolve_missing_account() {
        let conn = setup();
        assert!(AccountRepo::resolve_profile(&conn, "ghost").unwrap().is_none());
    }

    #[test]
    fn test_find_by_tax_id_matches_nif_or_niss() {
        let conn = setup();
        let mut owner = Account::new("acc-1", "Jo Silva", "jo@example.com");
        owner.nif = Some("123456789".to_string());
        owner.niss = Some("11223344556".to_string());
        AccountRepo::upsert(&conn, &owner).unwrap();

        let by_nif = AccountRepo::find_by_tax_id(&conn, "123456789").unwrap().unwrap();
        assert_eq!(by_nif.id, "acc-1");
        let by_niss = AccountRepo::find_by_tax_id(&conn, "11223344556").unwrap().unwrap();
        assert_eq!(by_niss.id, "acc-1");
    }

    #[test]
    fn test_find_by_tax_id_skips_inactive_accounts() {
        let conn = setup();
        let mut owner = Account::new("acc-1", "Jo Silva", "jo@example.com");
        owner.nif = Some("123456789".to_string());
        owner.is_active = false;
        AccountRepo::upsert(&conn, &owner).unwrap();

        assert!(AccountRepo::find_by_tax_id(&conn, "123456789").unwrap().is_none());
    }
}
