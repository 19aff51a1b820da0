//! Guarded product operations.
//!
//! Every command here resolves a capability check first and refuses with
//! a Forbidden error before touching the store. Edits go through the
//! allowlist pruning path when the actor only holds the partial grant.

use rusqlite::Connection;
use serde_json::{Map, Value};
use traceport_core::audit::AuditParams;
use traceport_core::errors::{Result, TraceportError};
use traceport_core::policy::{
    can_associate_owner, can_create, can_delete, can_edit_full, can_edit_partial,
    partial_edit_allowlist, prune_by_allowlist, Action,
};
use traceport_core::{log_op_end, log_op_start, EventType, Product, RoleProfile};
use traceport_store::repo::{AccountRepo, ProductRepo};

use super::audit_writer::log_product_audit;

/// Result of an edit command
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// False when the payload pruned to nothing or changed nothing
    pub changed: bool,
    pub product: Product,
    pub audit_id: Option<String>,
}

/// Keys an edit payload may never touch, whatever the grant
const PROTECTED_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

fn forbidden(action: Action, profile: &RoleProfile) -> TraceportError {
    TraceportError::Forbidden {
        action: action.as_str().to_string(),
        actor_id: profile.id.clone(),
    }
}

fn load_product(conn: &Connection, product_id: &str) -> Result<Product> {
    ProductRepo::get(conn, product_id)?.ok_or_else(|| TraceportError::ProductNotFound {
        product_id: product_id.to_string(),
    })
}

/// Create a product and write its create audit entry.
///
/// # Errors
///
/// Forbidden unless the actor is a superuser or a company profile.
pub fn create_product(conn: &Connection, profile: &RoleProfile, mut product: Product) -> Result<Product> {
    if !can_create(profile) {
        return Err(forbidden(Action::Create, profile));
    }

    log_op_start!("create_product", product_id = %product.id, actor_id = %profile.id);

    if product.created_by_id.is_none() {
        product.created_by_id = Some(profile.id.clone());
    }
    if profile.is_company && product.company_user_id.is_none() {
        product.company_user_id = Some(profile.id.clone());
    }

    ProductRepo::upsert(conn, &product)?;

    let record = log_product_audit(
        conn,
        AuditParams {
            product_id: product.id.clone(),
            event_type: Some(EventType::Create),
            source: Some("api".to_string()),
            actor_id: Some(profile.id.clone()),
            actor_name: profile.name.clone(),
            new_data: Some(product.snapshot()?),
            ..Default::default()
        },
    )?;

    log_op_end!("create_product", product_id = %product.id, audit_id = %record.id);
    Ok(product)
}

/// Soft-deactivate a product (superuser only).
///
/// The row stays; only the active flag flips. Deactivating an already
/// inactive product is a no-op without a ledger entry.
///
/// # Errors
///
/// Forbidden for non-superusers; NotFound for an unknown product id.
pub fn deactivate_product(
    conn: &Connection,
    profile: &RoleProfile,
    product_id: &str,
) -> Result<Product> {
    if !can_delete(profile) {
        return Err(forbidden(Action::Delete, profile));
    }

    log_op_start!("deactivate_product", product_id = %product_id, actor_id = %profile.id);

    let mut product = load_product(conn, product_id)?;
    if !product.is_active() {
        log_op_end!("deactivate_product", product_id = %product_id, changed = false);
        return Ok(product);
    }

    let previous_data = product.snapshot()?;
    product.identification.is_active = false;
    product.updated_by_id = Some(profile.id.clone());
    product.touch();
    ProductRepo::upsert(conn, &product)?;

    let record = log_product_audit(
        conn,
        AuditParams {
            product_id: product.id.clone(),
            event_type: Some(EventType::Delete),
            source: Some("api".to_string()),
            actor_id: Some(profile.id.clone()),
            actor_name: profile.name.clone(),
            previous_data: Some(previous_data),
            ..Default::default()
        },
    )?;

    log_op_end!("deactivate_product", product_id = %product_id, audit_id = %record.id);
    Ok(product)
}

/// Edit a product with a partial JSON payload.
///
/// Full editors may touch any section; actors holding only the partial
/// grant have the payload pruned to the usage-data allowlist first. A
/// payload that prunes to nothing, or that changes nothing, is a no-op
/// without a ledger entry.
///
/// # Errors
///
/// Forbidden when the actor holds neither grant; NotFound for an unknown
/// product; InvalidPayload when the merged document no longer decodes as
/// a product aggregate.
pub fn edit_product(
    conn: &Connection,
    profile: &RoleProfile,
    product_id: &str,
    payload: &Map<String, Value>,
) -> Result<EditOutcome> {
    let product = load_product(conn, product_id)?;

    let full = can_edit_full(profile, &product);
    let partial = can_edit_partial(profile, &product);
    if !full && !partial {
        return Err(forbidden(Action::EditFull, profile));
    }

    log_op_start!(
        "edit_product",
        product_id = %product_id,
        actor_id = %profile.id,
        full_grant = full,
    );

    let mut effective = if full {
        payload.clone()
    } else {
        prune_by_allowlist(payload, &partial_edit_allowlist())
    };
    for key in PROTECTED_KEYS {
        effective.remove(key);
    }

    if effective.is_empty() {
        log_op_end!("edit_product", product_id = %product_id, changed = false);
        return Ok(EditOutcome {
            changed: false,
            product,
            audit_id: None,
        });
    }

    let previous_data = product.snapshot()?;
    let mut merged = previous_data.clone();
    merge_json_deep(&mut merged, &effective);

    if merged == previous_data {
        log_op_end!("edit_product", product_id = %product_id, changed = false);
        return Ok(EditOutcome {
            changed: false,
            product,
            audit_id: None,
        });
    }

    let mut updated: Product = serde_json::from_value(Value::Object(merged)).map_err(|e| {
        TraceportError::InvalidPayload {
            reason: format!("edit payload produced an invalid product: {}", e),
        }
    })?;
    updated.updated_by_id = Some(profile.id.clone());
    updated.touch();
    ProductRepo::upsert(conn, &updated)?;

    let record = log_product_audit(
        conn,
        AuditParams {
            product_id: updated.id.clone(),
            event_type: Some(EventType::Update),
            source: Some("api".to_string()),
            actor_id: Some(profile.id.clone()),
            actor_name: profile.name.clone(),
            previous_data: Some(previous_data),
            new_data: Some(updated.snapshot()?),
            ..Default::default()
        },
    )?;

    log_op_end!("edit_product", product_id = %product_id, audit_id = %record.id);
    Ok(EditOutcome {
        changed: true,
        product: updated,
        audit_id: Some(record.id),
    })
}

/// Bind an owner to a product by NIF or NISS lookup.
///
/// # Errors
///
/// Forbidden without the associate-owner capability; AccountNotFound when
/// no active account carries the tax identifier.
pub fn associate_owner(
    conn: &Connection,
    profile: &RoleProfile,
    product_id: &str,
    tax_id: &str,
) -> Result<Product> {
    let mut product = load_product(conn, product_id)?;

    if !can_associate_owner(profile, &product) {
        return Err(forbidden(Action::AssociateOwner, profile));
    }

    log_op_start!("associate_owner", product_id = %product_id, actor_id = %profile.id);

    let owner = AccountRepo::find_by_tax_id(conn, tax_id)?.ok_or_else(|| {
        TraceportError::AccountNotFound {
            account_id: tax_id.to_string(),
        }
    })?;

    if product.owner_user_id.as_deref() == Some(owner.id.as_str()) {
        log_op_end!("associate_owner", product_id = %product_id, changed = false);
        return Ok(product);
    }

    let previous_data = product.snapshot()?;
    product.owner_user_id = Some(owner.id.clone());
    product.updated_by_id = Some(profile.id.clone());
    product.touch();
    ProductRepo::upsert(conn, &product)?;

    let record = log_product_audit(
        conn,
        AuditParams {
            product_id: product.id.clone(),
            event_type: Some(EventType::RelationChange),
            source: Some("api".to_string()),
            actor_id: Some(profile.id.clone()),
            actor_name: profile.name.clone(),
            previous_data: Some(previous_data),
            new_data: Some(product.snapshot()?),
            notes: Some(format!("owner bound to account {}", owner.id)),
            ..Default::default()
        },
    )?;

    log_op_end!("associate_owner", product_id = %product_id, audit_id = %record.id);
    Ok(product)
}

/// Deep-merge a patch into a JSON document: objects merge recursively,
/// everything else (arrays included) replaces wholesale.
fn merge_json_deep(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, patch_val) in patch {
        match (target.get_mut(key), patch_val) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_json_deep(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), patch_val.clone());
            }
        }
    }
}
