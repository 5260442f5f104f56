//! Green identification task lists and the online report.

use serde::{Deserialize, Serialize};

use super::{deserialize_string_or_number, display_time};
use crate::listing::TableRow;

/// Row of the pending, completed and archived task lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TaskItem {
    pub id: i64,
    /// Prefixed display id, `ID-<n>`
    #[serde(default)]
    pub identification_id: String,
    #[serde(default)]
    pub task_id: i64,
    #[serde(default)]
    pub loan_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub loan_account: String,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub loan_amount: Option<String>,
    #[serde(default)]
    pub disbursement_date: Option<String>,
    #[serde(default)]
    pub project_category_small: String,
    #[serde(default)]
    pub formatted_category: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub initiator_name: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub org_name: Option<String>,
}

impl TaskItem {
    /// Full category path when the backend resolved one.
    pub fn category(&self) -> &str {
        match self.formatted_category.as_deref() {
            Some(category) if !category.is_empty() => category,
            _ => &self.project_category_small,
        }
    }
}

/// Row of the combined task query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TaskSearchItem {
    pub task_id: i64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub loan_account: String,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub loan_amount: Option<String>,
    #[serde(default)]
    pub loan_date: Option<String>,
    #[serde(default)]
    pub green_project_category: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub assignee_name: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Row of the online report, one per identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReportRow {
    pub id: i64,
    #[serde(default)]
    pub level1_branch: String,
    #[serde(default)]
    pub level2_branch: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub loan_account: String,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub loan_amount: Option<String>,
    #[serde(default)]
    pub green_large: Option<String>,
    #[serde(default)]
    pub green_medium: Option<String>,
    #[serde(default)]
    pub green_small: Option<String>,
    #[serde(default)]
    pub initiator: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub loan_date: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl ReportRow {
    /// `large / medium / small`, skipping missing levels.
    pub fn category(&self) -> String {
        [&self.green_large, &self.green_medium, &self.green_small]
            .into_iter()
            .flatten()
            .filter(|level| !level.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

fn amount(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "0".to_string())
}

impl TableRow for TaskItem {
    const COLUMNS: &'static [&'static str] = &[
        "ID", "Customer", "Business", "Loan account", "Amount", "Disbursed", "Category", "Status",
        "Initiator", "Deadline",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.identification_id.clone(),
            self.customer_name.clone(),
            self.business_type.clone(),
            self.loan_account.clone(),
            amount(&self.loan_amount),
            display_time(self.disbursement_date.as_deref()),
            self.category().to_string(),
            self.status.clone(),
            self.initiator_name.clone(),
            display_time(self.deadline.as_deref()),
        ]
    }
}

impl TableRow for TaskSearchItem {
    const COLUMNS: &'static [&'static str] = &[
        "ID", "Customer", "Business", "Loan account", "Amount", "Loan date", "Category", "Status",
        "Initiator", "Completed",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            format!("ID-{}", self.task_id),
            self.customer_name.clone(),
            self.business_type.clone(),
            self.loan_account.clone(),
            amount(&self.loan_amount),
            display_time(self.loan_date.as_deref()),
            self.green_project_category.clone(),
            self.status.clone(),
            self.assignee_name.clone(),
            display_time(self.completed_at.as_deref()),
        ]
    }
}

impl TableRow for ReportRow {
    const COLUMNS: &'static [&'static str] = &[
        "Level 1 branch", "Level 2 branch", "Branch", "Customer", "Loan account", "Amount",
        "Category", "Initiator", "Loan date", "Status",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.level1_branch.clone(),
            self.level2_branch.clone(),
            self.branch.clone(),
            self.customer_name.clone(),
            self.loan_account.clone(),
            amount(&self.loan_amount),
            self.category(),
            self.initiator.clone(),
            display_time(self.loan_date.as_deref()),
            self.status.clone(),
        ]
    }
}
