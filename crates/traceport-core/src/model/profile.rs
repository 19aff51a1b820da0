use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolved identity of the acting user
///
/// The two capability flags are not mutually exclusive; policy evaluation
/// gives superuser priority over company over plain ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    /// Identity id, compared against the product's weak ownership references
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_company: bool,
}

impl RoleProfile {
    /// Plain profile with no capability flags
    pub fn plain(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_superuser: false,
            is_company: false,
        }
    }

    pub fn superuser(id: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::plain(id)
        }
    }

    pub fn company(id: impl Into<String>) -> Self {
        Self {
            is_company: true,
            ..Self::plain(id)
        }
    }
}

/// Persisted account identity
///
/// Accounts carry the role flags plus the NIF/NISS tax identifiers used to
/// bind an owner to a product. Passwords and login flows are out of scope;
/// the account repository only resolves identities to role profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nif: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niss: Option<String>,
    #[serde(default)]
    pub is_company: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create an active account with the given identity
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            full_name: full_name.into(),
            email: email.into(),
            nif: None,
            niss: None,
            is_company: false,
            is_superuser: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Resolve this account to a role profile for policy evaluation
    pub fn to_profile(&self) -> RoleProfile {
        RoleProfile {
            id: self.id.clone(),
            name: Some(self.full_name.clone()),
            is_superuser: self.is_superuser,
            is_company: self.is_company,
        }
    }
}
