//! Audit ledger repository
//!
//! Strictly append-only: the only write is INSERT. Rows are never
//! updated or deleted, and no such operation exists here. Listing orders
//! newest first by created_at, tie-broken by the time-ordered UUIDv7 id.

use crate::errors::{corrupt_row, from_rusqlite, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use traceport_core::diff::SnapshotDiff;
use traceport_core::{AuditRecord, EventType, LifecycleCategory, TraceportError};

const COLUMNS: &str = "id, product_id, product_code, event_type, source, source_channel, \
     request_id, actor_id, actor_name, actor_type, previous_data, new_data, diff, \
     lifecycle_category, lifecycle_type, related_product_id, has_struct_change, \
     has_lifecycle_change, notes, created_at";

/// SQLite repository for the append-only audit ledger
pub struct AuditRepo;

impl AuditRepo {
    /// Append an audit record to the ledger
    ///
    /// A duplicate id is a hard error, not an upsert.
    pub fn insert(conn: &Connection, record: &AuditRecord) -> Result<()> {
        let previous_data = encode_json(record.id.as_str(), record.previous_data.as_ref())?;
        let new_data = encode_json(record.id.as_str(), record.new_data.as_ref())?;
        let diff = encode_json(record.id.as_str(), record.diff.as_ref())?;

        conn.execute(
            &format!(
                "INSERT INTO product_audit ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
            ),
            params![
                record.id,
                record.product_id,
                record.product_code,
                record.event_type.as_str(),
                record.source,
                record.source_channel,
                record.request_id,
                record.actor_id,
                record.actor_name,
                record.actor_type,
                previous_data,
                new_data,
                diff,
                record.lifecycle_category.map(|c| c.as_str()),
                record.lifecycle_type,
                record.related_product_id,
                if record.has_struct_change { 1 } else { 0 },
                if record.has_lifecycle_change { 1 } else { 0 },
                record.notes,
                record.created_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get a single audit record by ID
    pub fn get(conn: &Connection, audit_id: &str) -> Result<Option<AuditRecord>> {
        let raw: Option<RawRow> = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM product_audit WHERE id = ?"),
                [audit_id],
                RawRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;

        raw.map(decode_record).transpose()
    }

    /// List a product's audit trail, newest first
    pub fn list_by_product(conn: &Connection, product_id: &str) -> Result<Vec<AuditRecord>> {
        query_records(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM product_audit WHERE product_id = ?
                 ORDER BY created_at DESC, id DESC"
            ),
            params![product_id],
        )
    }

    /// List all records of one event type, newest first
    pub fn list_by_event_type(conn: &Connection, event_type: EventType) -> Result<Vec<AuditRecord>> {
        query_records(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM product_audit WHERE event_type = ?
                 ORDER BY created_at DESC, id DESC"
            ),
            params![event_type.as_str()],
        )
    }

    /// List all records with one lifecycle category, newest first
    pub fn list_by_category(
        conn: &Connection,
        category: LifecycleCategory,
    ) -> Result<Vec<AuditRecord>> {
        query_records(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM product_audit WHERE lifecycle_category = ?
                 ORDER BY created_at DESC, id DESC"
            ),
            params![category.as_str()],
        )
    }

    /// List records created in the half-open interval [from, to)
    pub fn list_between(
        conn: &Connection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>> {
        query_records(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM product_audit
                 WHERE created_at >= ?1 AND created_at < ?2
                 ORDER BY created_at DESC, id DESC"
            ),
            params![from.timestamp_millis(), to.timestamp_millis()],
        )
    }

    /// Count ledger entries for a product
    pub fn count_for_product(conn: &Connection, product_id: &str) -> Result<u64> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM product_audit WHERE product_id = ?",
                [product_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(count as u64)
    }
}

fn query_records(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<AuditRecord>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    let raws: Vec<RawRow> = stmt
        .query_map(params, RawRow::from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    raws.into_iter().map(decode_record).collect()
}

fn encode_json<T: serde::Serialize>(audit_id: &str, value: Option<&T>) -> Result<Option<String>> {
    value
        .map(|v| {
            serde_json::to_string(v).map_err(|e| TraceportError::Persistence {
                message: format!("failed to encode audit row {}: {}", audit_id, e),
            })
        })
        .transpose()
}

/// Columns as fetched, before JSON/enum decoding
struct RawRow {
    id: String,
    product_id: String,
    product_code: Option<String>,
    event_type: String,
    source: Option<String>,
    source_channel: Option<String>,
    request_id: Option<String>,
    actor_id: Option<String>,
    actor_name: Option<String>,
    actor_type: String,
    previous_data: Option<String>,
    new_data: Option<String>,
    diff: Option<String>,
    lifecycle_category: Option<String>,
    lifecycle_type: Option<String>,
    related_product_id: Option<String>,
    has_struct_change: i32,
    has_lifecycle_change: i32,
    notes: Option<String>,
    created_at: i64,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            product_id: row.get(1)?,
            product_code: row.get(2)?,
            event_type: row.get(3)?,
            source: row.get(4)?,
            source_channel: row.get(5)?,
            request_id: row.get(6)?,
            actor_id: row.get(7)?,
            actor_name: row.get(8)?,
            actor_type: row.get(9)?,
            previous_data: row.get(10)?,
            new_data: row.get(11)?,
            diff: row.get(12)?,
            lifecycle_category: row.get(13)?,
            lifecycle_type: row.get(14)?,
            related_product_id: row.get(15)?,
            has_struct_change: row.get(16)?,
            has_lifecycle_change: row.get(17)?,
            notes: row.get(18)?,
            created_at: row.get(19)?,
        })
    }
}

fn decode_record(raw: RawRow) -> Result<AuditRecord> {
    let event_type =
        EventType::parse(&raw.event_type).ok_or_else(|| TraceportError::Persistence {
            message: format!(
                "unknown event_type '{}' on audit row {}",
                raw.event_type, raw.id
            ),
        })?;

    let lifecycle_category = raw
        .lifecycle_category
        .as_deref()
        .map(|s| {
            LifecycleCategory::parse(s).ok_or_else(|| TraceportError::Persistence {
                message: format!("unknown lifecycle_category '{}' on audit row {}", s, raw.id),
            })
        })
        .transpose()?;

    let previous_data: Option<Map<String, Value>> = decode_json(&raw.id, raw.previous_data)?;
    let new_data: Option<Map<String, Value>> = decode_json(&raw.id, raw.new_data)?;
    let diff: Option<SnapshotDiff> = decode_json(&raw.id, raw.diff)?;

    Ok(AuditRecord {
        id: raw.id,
        product_id: raw.product_id,
        product_code: raw.product_code,
        event_type,
        source: raw.source,
        source_channel: raw.source_channel,
        request_id: raw.request_id,
        actor_id: raw.actor_id,
        actor_name: raw.actor_name,
        actor_type: raw.actor_type,
        previous_data,
        new_data,
        diff,
        lifecycle_category,
        lifecycle_type: raw.lifecycle_type,
        related_product_id: raw.related_product_id,
        has_struct_change: raw.has_struct_change != 0,
        has_lifecycle_change: raw.has_lifecycle_change != 0,
        notes: raw.notes,
        created_at: DateTime::from_timestamp_millis(raw.created_at).unwrap_or_else(Utc::now),
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(id: &str, raw: Option<String>) -> Result<Option<T>> {
    raw.map(|s| serde_json::from_str(&s).map_err(|e| corrupt_row("product_audit", id, e)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use traceport_core::audit::{build_audit_record, AuditParams};
    use serde_json::json;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    fn snapshot(brand: &str) -> Map<String, Value> {
        match json!({"identification": {"brandName": brand, "serialNumber": "SN-1"}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn record(product_id: &str) -> AuditRecord {
        build_audit_record(AuditParams {
            product_id: product_id.to_string(),
            event_type: Some(EventType::Update),
            source: Some("broker".to_string()),
            source_channel: Some("mqtt_backend".to_string()),
            previous_data: Some(snapshot("Acme")),
            new_data: Some(snapshot("Apex")),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let conn = setup();
        let rec = record("prod-1");

        AuditRepo::insert(&conn, &rec).unwrap();
        let loaded = AuditRepo::get(&conn, &rec.id).unwrap().unwrap();

        assert_eq!(loaded.product_id, rec.product_id);
        assert_eq!(loaded.product_code.as_deref(), Some("SN-1"));
        assert_eq!(loaded.event_type, EventType::Update);
        assert_eq!(loaded.previous_data, rec.previous_data);
        assert_eq!(loaded.new_data, rec.new_data);
        assert_eq!(loaded.diff, rec.diff);
        assert!(loaded.has_struct_change);
        // Storage granularity is milliseconds
        assert_eq!(
            loaded.created_at.timestamp_millis(),
            rec.created_at.timestamp_millis()
        );
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let conn = setup();
        let rec = record("prod-1");

        AuditRepo::insert(&conn, &rec).unwrap();
        assert!(AuditRepo::insert(&conn, &rec).is_err());
    }

    #[test]
    fn test_list_by_product_is_newest_first() {
        let conn = setup();
        let first = record("prod-1");
        let second = record("prod-1");
        let other = record("prod-2");

        AuditRepo::insert(&conn, &first).unwrap();
        AuditRepo::insert(&conn, &second).unwrap();
        AuditRepo::insert(&conn, &other).unwrap();

        let trail = AuditRepo::list_by_product(&conn, "prod-1").unwrap();
        assert_eq!(trail.len(), 2);
        // UUIDv7 ids are time-ordered, so the later record sorts first
        assert_eq!(trail[0].id, second.id);
        assert_eq!(trail[1].id, first.id);
    }

    #[test]
    fn test_count_for_product() {
        let conn = setup();
        AuditRepo::insert(&conn, &record("prod-1")).unwrap();
        AuditRepo::insert(&conn, &record("prod-1")).unwrap();

        assert_eq!(AuditRepo::count_for_product(&conn, "prod-1").unwrap(), 2);
        assert_eq!(AuditRepo::count_for_product(&conn, "prod-9").unwrap(), 0);
    }

    #[test]
    fn test_filters_by_event_type_and_category() {
        let conn = setup();
        let update = record("prod-1");
        let lifecycle = build_audit_record(AuditParams {
            product_id: "prod-1".to_string(),
            event_type: Some(EventType::LifecycleEvent),
            previous_data: Some(snapshot("Acme")),
            new_data: Some(snapshot("Acme")),
            lifecycle_category: Some(LifecycleCategory::Maintenance),
            lifecycle_type: Some("scheduled_service".to_string()),
            ..Default::default()
        })
        .unwrap();

        AuditRepo::insert(&conn, &update).unwrap();
        AuditRepo::insert(&conn, &lifecycle).unwrap();

        let updates = AuditRepo::list_by_event_type(&conn, EventType::Update).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, update.id);

        let maint = AuditRepo::list_by_category(&conn, LifecycleCategory::Maintenance).unwrap();
        assert_eq!(maint.len(), 1);
        assert_eq!(maint[0].id, lifecycle.id);
    }
}
