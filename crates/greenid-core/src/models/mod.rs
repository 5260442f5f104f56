//! Request and response payloads of the backend API.
//!
//! - this module: login, captcha and announcement payloads, plus the list
//!   envelope shared by every list endpoint
//! - `system`: roles and organizations (users reuse `Identity`)
//! - `logs`: operation, login and exception log entries
//! - `tasks`: green identification task lists and the online report
//! - `workflow`: process definitions, instances and variables

pub mod logs;
pub mod system;
pub mod tasks;
pub mod workflow;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;

pub use logs::{ExceptionLog, LoginLog, OperationLog};
pub use system::{Organization, Role};
pub use tasks::{ReportRow, TaskItem, TaskSearchItem};
pub use workflow::{ProcessDefinition, ProcessInstance, WorkflowVariable};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<String>,
}

/// Successful credential exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: Identity,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Captcha {
    pub captcha: String,
}

/// Generic `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<NaiveDateTime>,
}

impl Announcement {
    /// One-line text for scrolling display.
    pub fn headline(&self) -> String {
        match self.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => format!("{}: {}", self.title, summary),
            _ => self.title.clone(),
        }
    }
}

// ============================================================================
// List envelopes
// ============================================================================

/// Body of a list endpoint. Some endpoints return a bare array, others wrap
/// the page in `{"data"|"items": [...], "total": n}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Plain(Vec<T>),
    Paged {
        #[serde(alias = "items")]
        data: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl<T> ListBody<T> {
    /// Rows of this page and the total across all pages.
    pub fn into_parts(self) -> (Vec<T>, u64) {
        match self {
            ListBody::Plain(rows) => {
                let total = rows.len() as u64;
                (rows, total)
            }
            ListBody::Paged { data, total } => {
                let total = total.unwrap_or(data.len() as u64);
                (data, total)
            }
        }
    }
}

/// Backend timestamp as shown in tables: date and time to the second.
/// Accepts both `2024-05-01T09:00:00.123` and `2024-05-01 09:00:00`.
pub fn display_time(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    raw.chars()
        .take(19)
        .map(|c| if c == 'T' { ' ' } else { c })
        .collect()
}

/// Amounts arrive as JSON numbers or as decimal strings depending on the
/// endpoint.
pub(crate) fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            Ok((!v.is_empty()).then(|| v.to_string()))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}
