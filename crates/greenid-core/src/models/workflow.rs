//! Workflow engine records.

use serde::{Deserialize, Serialize};

use super::display_time;
use super::system::yes_no;
use crate::listing::TableRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProcessDefinition {
    pub id: i64,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub deployed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub instance_count: i64,
}

/// The definition summary embedded in an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DefinitionRef {
    pub id: i64,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProcessInstance {
    pub id: i64,
    #[serde(default)]
    pub instance_key: String,
    #[serde(default)]
    pub business_key: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub current_node: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub definition: Option<DefinitionRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct WorkflowVariable {
    pub id: i64,
    pub definition_id: i64,
    pub variable_name: String,
    pub variable_key: String,
    pub variable_type: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub definition_name: Option<String>,
}

impl TableRow for ProcessDefinition {
    const COLUMNS: &'static [&'static str] =
        &["Key", "Name", "Version", "Status", "Instances", "Deployed", "Created"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.name.clone(),
            format!("v{}", self.version),
            self.status.clone(),
            self.instance_count.to_string(),
            display_time(self.deployed_at.as_deref()),
            display_time(self.created_at.as_deref()),
        ]
    }
}

impl TableRow for ProcessInstance {
    const COLUMNS: &'static [&'static str] =
        &["Instance", "Process", "Business key", "Status", "Current node", "Started", "Completed"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.instance_key.clone(),
            self.definition
                .as_ref()
                .map(|d| format!("{} v{}", d.name, d.version))
                .unwrap_or_default(),
            self.business_key.clone(),
            self.status.clone(),
            self.current_node.clone().unwrap_or_default(),
            display_time(self.started_at.as_deref()),
            display_time(self.completed_at.as_deref()),
        ]
    }
}

impl TableRow for WorkflowVariable {
    const COLUMNS: &'static [&'static str] =
        &["Process", "Name", "Key", "Type", "Default", "Required", "Description"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.definition_name
                .clone()
                .unwrap_or_else(|| format!("#{}", self.definition_id)),
            self.variable_name.clone(),
            self.variable_key.clone(),
            self.variable_type.clone(),
            self.default_value.clone().unwrap_or_default(),
            yes_no(self.required),
            self.description.clone().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_without_definition() {
        let instance: ProcessInstance = serde_json::from_str(
            r#"{"id": 4, "instance_key": "PI-4", "business_key": "ID-12", "status": "running",
                "current_node": "Branch review", "started_at": "2024-02-03T04:05:06",
                "completed_at": null, "definition": null}"#,
        )
        .unwrap();
        assert_eq!(
            instance.cells(),
            vec!["PI-4", "", "ID-12", "running", "Branch review", "2024-02-03 04:05:06", ""]
        );
    }

    #[test]
    fn test_variable_falls_back_to_definition_id() {
        let variable: WorkflowVariable = serde_json::from_str(
            r#"{"id": 1, "definition_id": 7, "variable_name": "Amount", "variable_key": "amount",
                "variable_type": "number", "required": true}"#,
        )
        .unwrap();
        assert_eq!(variable.cells()[0], "#7");
        assert_eq!(variable.cells()[5], "yes");
    }
}
