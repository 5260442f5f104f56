//! System management records: users, roles and organizations.

use serde::{Deserialize, Serialize};

use super::display_time;
use crate::auth::Identity;
use crate::listing::TableRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Organization {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_level() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

pub(crate) fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

impl TableRow for Identity {
    const COLUMNS: &'static [&'static str] =
        &["Username", "Name", "Employee ID", "Email", "Phone", "Active", "Admin"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.real_name.clone(),
            self.employee_id.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            yes_no(self.is_active),
            yes_no(self.is_superuser),
        ]
    }
}

impl TableRow for Role {
    const COLUMNS: &'static [&'static str] = &["Name", "Description", "Permissions", "Created"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
            self.permissions.as_ref().map(Vec::len).unwrap_or(0).to_string(),
            display_time(self.created_at.as_deref()),
        ]
    }
}

impl TableRow for Organization {
    const COLUMNS: &'static [&'static str] = &["Code", "Name", "Level", "Active", "Created"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.level.to_string(),
            yes_no(self.is_active),
            display_time(self.created_at.as_deref()),
        ]
    }
}
