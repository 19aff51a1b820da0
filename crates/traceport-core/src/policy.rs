//! Role-based authorization policy and allowlist pruning
//!
//! All capability checks route through one central [`authorize`] function
//! that evaluates roles in explicit priority order: superuser > company >
//! plain owner. Policy functions are pure booleans over an
//! already-resolved profile; a denial is `false`, never an error - the
//! API boundary decides how to surface it.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::model::{Product, RoleProfile};

/// Product operations gated by the capability matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a new product
    Create,
    /// Soft-deactivate a product
    Delete,
    /// Read a product record
    View,
    /// Edit all sections and file attachments
    EditFull,
    /// Edit allowlisted fields only (owner grant)
    EditPartial,
    /// Bind an owner identity via NIF/NISS lookup
    AssociateOwner,
}

impl Action {
    /// Stable name used in denial errors and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::View => "view",
            Action::EditFull => "edit_full",
            Action::EditPartial => "edit_partial",
            Action::AssociateOwner => "associate_owner",
        }
    }
}

/// Central capability evaluator.
///
/// Roles are checked in priority order - superuser first, company second,
/// plain ownership last - rather than relying on incidental branch
/// ordering at call sites. `Create` and `Delete` ignore the product
/// argument (callers pass the product they intend to touch, or any
/// placeholder is acceptable for `Create`).
pub fn authorize(profile: &RoleProfile, action: Action, product: &Product) -> bool {
    // Superuser: everything except the owner-only partial grant, which it
    // does not need (edit-full subsumes it).
    if profile.is_superuser {
        return !matches!(action, Action::EditPartial)
            || product.owner_user_id.as_deref() == Some(profile.id.as_str());
    }

    if profile.is_company {
        match action {
            Action::Create => return true,
            Action::Delete => return false,
            Action::View => {
                return product.company_user_id.as_deref() == Some(profile.id.as_str())
                    || product.created_by_id.as_deref() == Some(profile.id.as_str())
            }
            Action::EditFull => {
                return product.company_user_id.as_deref() == Some(profile.id.as_str())
            }
            Action::AssociateOwner => {
                // Only if it also holds edit-full on that product
                return authorize(profile, Action::EditFull, product);
            }
            Action::EditPartial => {
                // Independent grant, falls through to the ownership check
            }
        }
    }

    // Plain ownership
    match action {
        Action::View | Action::EditPartial => {
            product.owner_user_id.as_deref() == Some(profile.id.as_str())
        }
        _ => false,
    }
}

/// `create` = superuser OR company
pub fn can_create(profile: &RoleProfile) -> bool {
    profile.is_superuser || profile.is_company
}

/// `delete` (soft deactivate) = superuser only
pub fn can_delete(profile: &RoleProfile) -> bool {
    profile.is_superuser
}

/// `view`: superuser always; company by management/creation; plain by ownership
///
/// The actor id is passed separately per the external API contract - for
/// plain profiles the ownership check uses it rather than the profile id.
pub fn can_view(profile: &RoleProfile, actor_id: &str, product: &Product) -> bool {
    if profile.is_superuser {
        return true;
    }
    if profile.is_company
        && (product.company_user_id.as_deref() == Some(profile.id.as_str())
            || product.created_by_id.as_deref() == Some(profile.id.as_str()))
    {
        return true;
    }
    product.owner_user_id.as_deref() == Some(actor_id)
}

/// `edit-full`: superuser always; company when it manages the product
pub fn can_edit_full(profile: &RoleProfile, product: &Product) -> bool {
    if profile.is_superuser {
        return true;
    }
    profile.is_company && product.company_user_id.as_deref() == Some(profile.id.as_str())
}

/// `edit-partial`: ownership grant, independent of (and coexisting with) edit-full
pub fn can_edit_partial(profile: &RoleProfile, product: &Product) -> bool {
    product.owner_user_id.as_deref() == Some(profile.id.as_str())
}

/// `associate-owner`: superuser always; company only with edit-full
pub fn can_associate_owner(profile: &RoleProfile, product: &Product) -> bool {
    if profile.is_superuser {
        return true;
    }
    profile.is_company && can_edit_full(profile, product)
}

/// Allowlist tree restricting which fields a partial editor may touch
///
/// A leaf grants the whole subtree under its key; a nested node grants
/// only the listed children.
#[derive(Debug, Clone, PartialEq)]
pub enum Allowlist {
    /// Key fully allowed, nested payload kept as-is
    Allow,
    /// Only the listed child keys are allowed
    Fields(BTreeMap<String, Allowlist>),
}

impl Allowlist {
    /// Build a nested node from (key, rule) pairs
    pub fn fields<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Allowlist)>,
    {
        Allowlist::Fields(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

/// Prune a payload against an allowlist tree.
///
/// Keeps only keys present in the allowlist. For nested allowlists the
/// sub-payload is pruned recursively and kept only if non-empty. Keys
/// absent from the allowlist are dropped silently - not an error. A
/// payload pruned to empty is a legitimate no-op for the caller.
pub fn prune_by_allowlist(payload: &Map<String, Value>, spec: &Allowlist) -> Map<String, Value> {
    let rules = match spec {
        // A bare Allow at the root keeps everything
        Allowlist::Allow => return payload.clone(),
        Allowlist::Fields(rules) => rules,
    };

    let mut kept = Map::new();
    for (key, value) in payload {
        match rules.get(key) {
            None => {}
            Some(Allowlist::Allow) => {
                kept.insert(key.clone(), value.clone());
            }
            Some(nested @ Allowlist::Fields(_)) => {
                if let Value::Object(sub) = value {
                    let pruned = prune_by_allowlist(sub, nested);
                    if !pruned.is_empty() {
                        kept.insert(key.clone(), Value::Object(pruned));
                    }
                }
                // Non-object payload under a nested rule is dropped
            }
        }
    }
    kept
}

/// Fields a plain owner may modify: the usage-data slice, nothing structural
pub fn partial_edit_allowlist() -> Allowlist {
    Allowlist::fields([(
        "usageData",
        Allowlist::fields([
            ("environment", Allowlist::Allow),
            ("usageFrequency", Allowlist::Allow),
            ("averageUsagePerDay", Allowlist::Allow),
            ("lastUsedAt", Allowlist::Allow),
            ("condition", Allowlist::Allow),
            ("notes", Allowlist::Allow),
            ("maintenanceHistory", Allowlist::Allow),
            ("repairHistory", Allowlist::Allow),
        ]),
    )])
}
