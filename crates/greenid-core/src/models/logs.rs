//! Audit log entries.

use serde::{Deserialize, Serialize};

use super::display_time;
use crate::listing::TableRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OperationLog {
    pub id: i64,
    #[serde(default)]
    pub operation_time: Option<String>,
    #[serde(default)]
    pub operation_menu: Option<String>,
    #[serde(default)]
    pub request_url: Option<String>,
    /// Seconds
    #[serde(default)]
    pub request_duration: Option<f64>,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub operator_account: Option<String>,
    #[serde(default)]
    pub request_method: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginLog {
    pub id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_account: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub login_time: Option<String>,
    #[serde(default)]
    pub logout_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ExceptionLog {
    pub id: i64,
    #[serde(default)]
    pub exception_module: Option<String>,
    #[serde(default)]
    pub exception_interface: Option<String>,
    #[serde(default)]
    pub exception_time: Option<String>,
    #[serde(default)]
    pub exception_type: Option<String>,
    #[serde(default)]
    pub exception_message: Option<String>,
    #[serde(default)]
    pub request_url: Option<String>,
    #[serde(default)]
    pub request_method: Option<String>,
    #[serde(default)]
    pub user_account: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    /// 1 once someone marked it resolved
    #[serde(default)]
    pub is_resolved: Option<i64>,
    #[serde(default)]
    pub resolved_note: Option<String>,
}

impl ExceptionLog {
    pub fn is_resolved(&self) -> bool {
        self.is_resolved.unwrap_or(0) != 0
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl TableRow for OperationLog {
    const COLUMNS: &'static [&'static str] =
        &["Time", "Menu", "Method", "URL", "Operator", "IP", "Status", "Duration"];

    fn cells(&self) -> Vec<String> {
        vec![
            display_time(self.operation_time.as_deref()),
            text(&self.operation_menu),
            text(&self.request_method),
            text(&self.request_url),
            match (&self.operator_name, &self.operator_account) {
                (Some(name), Some(account)) => format!("{} ({})", name, account),
                (name, account) => name.clone().or_else(|| account.clone()).unwrap_or_default(),
            },
            text(&self.ip_address),
            self.status_code.map(|code| code.to_string()).unwrap_or_default(),
            self.request_duration
                .map(|secs| format!("{:.0}ms", secs * 1000.0))
                .unwrap_or_default(),
        ]
    }
}

impl TableRow for LoginLog {
    const COLUMNS: &'static [&'static str] =
        &["Login", "Logout", "Account", "Name", "IP", "Browser", "OS", "Status", "Reason"];

    fn cells(&self) -> Vec<String> {
        vec![
            display_time(self.login_time.as_deref()),
            display_time(self.logout_time.as_deref()),
            text(&self.user_account),
            text(&self.user_name),
            text(&self.ip_address),
            text(&self.browser),
            text(&self.os),
            text(&self.status),
            text(&self.failure_reason),
        ]
    }
}

impl TableRow for ExceptionLog {
    const COLUMNS: &'static [&'static str] =
        &["Time", "Module", "Type", "Message", "URL", "Account", "Resolved"];

    fn cells(&self) -> Vec<String> {
        vec![
            display_time(self.exception_time.as_deref()),
            text(&self.exception_module),
            text(&self.exception_type),
            text(&self.exception_message),
            text(&self.request_url),
            text(&self.user_account),
            super::system::yes_no(self.is_resolved()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_log_cells() {
        let log: OperationLog = serde_json::from_str(
            r#"{"id": 9, "operation_time": "2024-06-01T12:30:45.5", "operation_menu": "Users",
                "request_url": "/api/system/users", "request_duration": 0.042,
                "operator_name": "Admin", "operator_account": "admin", "request_method": "GET",
                "ip_address": "10.0.0.1", "status_code": 200}"#,
        )
        .unwrap();
        assert_eq!(
            log.cells(),
            vec![
                "2024-06-01 12:30:45",
                "Users",
                "GET",
                "/api/system/users",
                "Admin (admin)",
                "10.0.0.1",
                "200",
                "42ms"
            ]
        );
    }

    #[test]
    fn test_exception_log_resolution_flag() {
        let open: ExceptionLog = serde_json::from_str(r#"{"id": 1, "is_resolved": 0}"#).unwrap();
        let done: ExceptionLog = serde_json::from_str(r#"{"id": 2, "is_resolved": 1}"#).unwrap();
        let unknown: ExceptionLog = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert!(!open.is_resolved());
        assert!(done.is_resolved());
        assert!(!unknown.is_resolved());
        assert_eq!(done.cells().last().map(String::as_str), Some("yes"));
    }
}
