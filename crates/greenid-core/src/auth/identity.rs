use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Permission names granted to the current user (e.g. "system-user").
/// Order is irrelevant; persisted as a JSON array.
pub type PermissionSet = BTreeSet<String>;

/// Profile of the authenticated user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub org_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub last_login: Option<NaiveDateTime>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl Identity {
    /// Name shown in the status bar: real name when set, else the account.
    pub fn display_name(&self) -> &str {
        if self.real_name.trim().is_empty() {
            &self.username
        } else {
            &self.real_name
        }
    }

    /// Permissions embedded in the login response, as a set.
    pub fn permission_set(&self) -> PermissionSet {
        self.permissions
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_parses_backend_payload() {
        let json = r#"{
            "username": "zhangsan",
            "real_name": "Zhang San",
            "employee_id": null,
            "email": "zs@example.com",
            "role_id": 2,
            "org_id": 10001,
            "id": 7,
            "is_active": true,
            "is_superuser": false,
            "created_at": "2024-03-01T08:30:00.123456",
            "last_login": null,
            "permissions": ["dashboard", "system-user"]
        }"#;

        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.id, 7);
        assert_eq!(identity.org_id, Some(10001));
        assert!(identity.created_at.is_some());
        assert!(identity.permission_set().contains("system-user"));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let identity: Identity =
            serde_json::from_str(r#"{"id": 1, "username": "admin", "real_name": "  "}"#).unwrap();
        assert_eq!(identity.display_name(), "admin");
        assert!(identity.is_active);
        assert!(identity.permission_set().is_empty());
    }
}
